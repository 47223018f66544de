//! Users Repository
//!
//! PostgreSQL `users` 테이블 기반 계정 디렉토리.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use identity_core::{
    Account, AccountDirectory, AccountUpdate, DirectoryError, DirectoryResult, NewAccount, Role,
    UserId,
};
use sqlx::{FromRow, PgPool};
use tracing::warn;
use uuid::Uuid;

// ================================================================================================
// Types
// ================================================================================================

/// users 테이블 레코드
#[derive(Debug, Clone, FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    password: String,
    #[sqlx(default)]
    first_name: Option<String>,
    #[sqlx(default)]
    last_name: Option<String>,
    #[sqlx(default)]
    phone: Option<String>,
    #[sqlx(default)]
    user_type: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRecord> for Account {
    fn from(record: UserRecord) -> Self {
        let role = match record.user_type.as_deref() {
            Some(raw) => {
                let parsed = Role::parse(raw);
                if parsed.is_none() {
                    warn!(user_id = %record.id, user_type = raw, "Unknown stored user_type");
                }
                parsed
            }
            None => None,
        };

        Account {
            id: UserId::from_uuid(record.id),
            email: record.email,
            password_hash: record.password,
            first_name: record.first_name,
            last_name: record.last_name,
            phone: record.phone,
            role,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, email, password, first_name, last_name, phone, user_type, created_at, updated_at";

fn map_sqlx_error(e: sqlx::Error) -> DirectoryError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return DirectoryError::DuplicateEmail;
        }
    }
    match e {
        sqlx::Error::PoolTimedOut => DirectoryError::Timeout,
        other => DirectoryError::Storage(other.to_string()),
    }
}

// ================================================================================================
// Repository
// ================================================================================================

/// PostgreSQL 계정 디렉토리.
#[derive(Clone)]
pub struct PgAccountDirectory {
    pool: PgPool,
}

impl PgAccountDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountDirectory for PgAccountDirectory {
    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<Account>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(record.map(Account::from))
    }

    async fn find_by_id(&self, id: UserId) -> DirectoryResult<Option<Account>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(record.map(Account::from))
    }

    async fn create(&self, account: NewAccount) -> DirectoryResult<Account> {
        let sql = format!(
            r#"
            INSERT INTO users (id, email, password, first_name, last_name, phone, user_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.phone)
            .bind(account.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(record.into())
    }

    async fn list(&self, limit: i64, offset: i64) -> DirectoryResult<Vec<Account>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        let records = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(records.into_iter().map(Account::from).collect())
    }

    async fn update(&self, id: UserId, update: AccountUpdate) -> DirectoryResult<Option<Account>> {
        let sql = format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                phone = COALESCE($5, phone),
                user_type = COALESCE($6, user_type),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id.as_uuid())
            .bind(&update.email)
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.phone)
            .bind(update.role.map(|r| r.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(record.map(Account::from))
    }

    async fn delete(&self, id: UserId) -> DirectoryResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> DirectoryResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}
