use crate::domain::error::{AppError, Result};
use crate::domain::region::{Region, RegionLevel};
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqlitePool;
use sqlx::Sqlite;
use tracing::warn;

/// Write side of the region tree, as seen by the bulk loader.
#[async_trait]
pub trait RegionStore {
    async fn disable_integrity(&mut self) -> Result<()>;
    async fn enable_integrity(&mut self) -> Result<()>;
    /// Removes every row of `level` and resets its id sequence.
    async fn clear_level(&mut self, level: RegionLevel) -> Result<()>;
    /// Inserts one record and returns its new id.
    async fn insert_region(
        &mut self,
        level: RegionLevel,
        code: &str,
        name: &str,
        parent_id: Option<i64>,
    ) -> Result<i64>;
}

/// Loader store pinned to one pooled connection. SQLite's `foreign_keys`
/// pragma is per connection, so toggling it and writing must share one.
///
/// A connection whose checks were switched off and never confirmed back on
/// is detached from the pool when the store drops, so no other pool user
/// can receive it.
pub struct SqliteRegionStore {
    conn: Option<PoolConnection<Sqlite>>,
    integrity_off: bool,
}

impl SqliteRegionStore {
    pub async fn acquire(pool: &SqlitePool) -> Result<Self> {
        let conn = pool
            .acquire()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to acquire connection: {e}")))?;
        Ok(Self {
            conn: Some(conn),
            integrity_off: false,
        })
    }

    fn conn(&mut self) -> Result<&mut PoolConnection<Sqlite>> {
        self.conn
            .as_mut()
            .ok_or_else(|| AppError::Internal("Region store connection already released".to_string()))
    }

    async fn set_foreign_keys(&mut self, enabled: bool) -> Result<()> {
        let sql = if enabled {
            "PRAGMA foreign_keys = ON"
        } else {
            "PRAGMA foreign_keys = OFF"
        };
        sqlx::query(sql)
            .execute(&mut **self.conn()?)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to set foreign keys: {e}")))?;

        let current: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&mut **self.conn()?)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to read foreign keys: {e}")))?;
        if (current == 1) != enabled {
            return Err(AppError::DatabaseError(format!(
                "foreign_keys is {current} after switching it {}",
                if enabled { "on" } else { "off" }
            )));
        }
        Ok(())
    }
}

impl Drop for SqliteRegionStore {
    fn drop(&mut self) {
        if !self.integrity_off {
            return;
        }
        if let Some(conn) = self.conn.take() {
            warn!("Discarding connection left with foreign key checks off");
            drop(conn.detach());
        }
    }
}

#[async_trait]
impl RegionStore for SqliteRegionStore {
    async fn disable_integrity(&mut self) -> Result<()> {
        self.integrity_off = true;
        self.set_foreign_keys(false).await
    }

    async fn enable_integrity(&mut self) -> Result<()> {
        self.set_foreign_keys(true).await?;
        self.integrity_off = false;
        Ok(())
    }

    async fn clear_level(&mut self, level: RegionLevel) -> Result<()> {
        let table = level.table();
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut **self.conn()?)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to clear {table}: {e}")))?;

        sqlx::query("DELETE FROM sqlite_sequence WHERE name = ?")
            .bind(table)
            .execute(&mut **self.conn()?)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to reset {table} sequence: {e}"))
            })?;
        Ok(())
    }

    async fn insert_region(
        &mut self,
        level: RegionLevel,
        code: &str,
        name: &str,
        parent_id: Option<i64>,
    ) -> Result<i64> {
        let table = level.table();
        let conn = self.conn()?;
        let result = match level.parent_column() {
            None => {
                sqlx::query(&format!("INSERT INTO {table} (code, name) VALUES (?, ?)"))
                    .bind(code)
                    .bind(name)
                    .execute(&mut **conn)
                    .await
            }
            Some(parent_column) => {
                sqlx::query(&format!(
                    "INSERT INTO {table} (code, {parent_column}, name) VALUES (?, ?, ?)"
                ))
                .bind(code)
                .bind(parent_id)
                .bind(name)
                .execute(&mut **conn)
                .await
            }
        }
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert into {table}: {e}")))?;

        Ok(result.last_insert_rowid())
    }
}

/// Read side of the region tree, used by the select-option feeds.
pub struct RegionRepository {
    pool: SqlitePool,
}

impl RegionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn count(&self, level: RegionLevel) -> Result<i64> {
        let table = level.table();
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count {table}: {e}")))
    }

    /// All rows of one level, ordered by code, with the parent code resolved.
    pub async fn list_level(&self, level: RegionLevel) -> Result<Vec<Region>> {
        let sql = match (level.parent(), level.parent_column()) {
            (Some(parent), Some(parent_column)) => format!(
                "SELECT r.id, r.code, r.name, r.{parent_column} AS parent_id, p.code AS parent_code
                 FROM {table} r LEFT JOIN {parent_table} p ON p.id = r.{parent_column}
                 ORDER BY r.code",
                table = level.table(),
                parent_table = parent.table(),
            ),
            _ => format!(
                "SELECT id, code, name, NULL AS parent_id, NULL AS parent_code
                 FROM {table} ORDER BY code",
                table = level.table(),
            ),
        };

        let rows = sqlx::query_as::<_, RegionEntity>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to list {}: {e}", level.table()))
            })?;

        Ok(rows.into_iter().map(|row| row.into_region(level)).collect())
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Region> {
        let level = RegionLevel::classify(code)
            .ok_or_else(|| AppError::ValidationError(format!("Unrecognized region code: {code}")))?;

        self.list_level(level)
            .await?
            .into_iter()
            .find(|region| region.code == code)
            .ok_or_else(|| AppError::NotFound(format!("Region not found: {code}")))
    }

    /// Names of `level` rows whose parent is named `parent_name`, as the
    /// cascading address selects key on names rather than ids.
    pub async fn child_names(&self, level: RegionLevel, parent_name: &str) -> Result<Vec<String>> {
        let (parent, parent_column) = match (level.parent(), level.parent_column()) {
            (Some(parent), Some(parent_column)) => (parent, parent_column),
            _ => return self.names(level).await,
        };

        let sql = format!(
            "SELECT DISTINCT c.name FROM {table} c
             JOIN {parent_table} p ON p.id = c.{parent_column}
             WHERE p.name = ?
             ORDER BY c.name",
            table = level.table(),
            parent_table = parent.table(),
        );

        sqlx::query_scalar::<_, String>(&sql)
            .bind(parent_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to list {} names: {e}", level.table()))
            })
    }

    pub async fn names(&self, level: RegionLevel) -> Result<Vec<String>> {
        let table = level.table();
        sqlx::query_scalar::<_, String>(&format!("SELECT DISTINCT name FROM {table} ORDER BY name"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list {table} names: {e}")))
    }
}

#[derive(sqlx::FromRow)]
struct RegionEntity {
    id: i64,
    code: String,
    name: String,
    parent_id: Option<i64>,
    parent_code: Option<String>,
}

impl RegionEntity {
    fn into_region(self, level: RegionLevel) -> Region {
        Region {
            id: self.id,
            level,
            code: self.code,
            name: self.name,
            parent_id: self.parent_id,
            parent_code: self.parent_code,
        }
    }
}
