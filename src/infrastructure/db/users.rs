use crate::domain::catalog::{AddressOwner, TernaryFilter};
use crate::domain::error::{AppError, Result};
use crate::domain::user::{User, UserInput, UserStatus, UserType};
use crate::infrastructure::db::catalog::{insert_address_row, parse_enum, push_status_filter};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, uuid, name, email, email_verified_at, user_type, status, profile_picture, gender, date_of_birth, phone_number, created_at, updated_at";

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts the user and its addresses in one transaction.
    pub async fn insert(&self, input: &UserInput) -> Result<User> {
        let user_type: &'static str = input.user_type.into();
        let status: &'static str = input.status.into();
        let gender: Option<&'static str> = input.gender.map(Into::into);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {e}")))?;

        let result = sqlx::query(
            "INSERT INTO users (uuid, name, email, user_type, status, profile_picture, gender, date_of_birth, phone_number)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&input.name)
        .bind(&input.email)
        .bind(user_type)
        .bind(status)
        .bind(&input.profile_picture)
        .bind(gender)
        .bind(input.date_of_birth)
        .bind(&input.phone_number)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert user: {e}")))?;

        let id = result.last_insert_rowid();
        for address in &input.addresses {
            insert_address_row(&mut *tx, AddressOwner::User, id, address).await?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit user: {e}")))?;

        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<User> {
        let user = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch user: {e}")))?;

        match user {
            Some(user) => user.try_into(),
            None => Err(AppError::NotFound(format!("User not found: {}", id))),
        }
    }

    pub async fn list(&self, filter: TernaryFilter, user_type: Option<UserType>) -> Result<Vec<User>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        let has_where = push_status_filter(&mut query, filter.statuses::<UserStatus>());
        if let Some(user_type) = user_type {
            let user_type: &'static str = user_type.into();
            query.push(if has_where { " AND " } else { " WHERE " });
            query.push("user_type = ").push_bind(user_type);
        }
        query.push(" ORDER BY name");

        let rows = query
            .build_query_as::<UserEntity>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list users: {e}")))?;

        rows.into_iter().map(User::try_from).collect()
    }

    pub async fn set_status(&self, id: i64, status: UserStatus) -> Result<User> {
        let status: &'static str = status.into();
        let result = sqlx::query(
            "UPDATE users SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(status)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update user status: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User not found: {}", id)));
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete user: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User not found: {}", id)));
        }
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct UserEntity {
    id: i64,
    uuid: String,
    name: String,
    email: String,
    email_verified_at: Option<DateTime<Utc>>,
    user_type: String,
    status: String,
    profile_picture: Option<String>,
    gender: Option<String>,
    date_of_birth: Option<NaiveDate>,
    phone_number: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserEntity> for User {
    type Error = AppError;

    fn try_from(e: UserEntity) -> Result<Self> {
        Ok(Self {
            id: e.id,
            uuid: e.uuid,
            name: e.name,
            email: e.email,
            email_verified_at: e.email_verified_at,
            user_type: parse_enum("user type", &e.user_type)?,
            status: parse_enum("user status", &e.status)?,
            profile_picture: e.profile_picture,
            gender: e
                .gender
                .as_deref()
                .map(|g| parse_enum("gender", g))
                .transpose()?,
            date_of_birth: e.date_of_birth,
            phone_number: e.phone_number,
            created_at: e.created_at,
            updated_at: e.updated_at,
        })
    }
}
