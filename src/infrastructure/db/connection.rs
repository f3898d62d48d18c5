use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::DatabaseSettings;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

const ADMIN_SCHEMA: &str = include_str!("../../../resources/schema.sql");

pub async fn init_admin_db(settings: &DatabaseSettings) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .map_err(|e| AppError::DatabaseError(format!("Failed to parse database URL: {e}")))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(settings.busy_timeout_secs));

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.busy_timeout_secs))
        .connect_with(options)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to connect to database: {e}")))?;

    apply_schema(&pool).await?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Database health check failed: {e}")))?;

    info!(url = %settings.url, "Admin database ready");
    Ok(pool)
}

pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for statement in ADMIN_SCHEMA.split(';') {
        let stmt = statement.trim();
        if stmt.is_empty() {
            continue;
        }
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to apply schema statement: {e}")))?;
    }
    Ok(())
}

/// Single-connection in-memory pool with the schema applied. Every pooled
/// connection to `sqlite::memory:` is its own database, so the pool is
/// pinned to one connection that never expires.
#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    apply_schema(&pool).await.unwrap();
    pool
}
