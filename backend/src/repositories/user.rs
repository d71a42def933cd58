//! Credential store: user records for registration and login

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Credential store failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// The email is already registered
    #[error("email already registered")]
    Conflict,
    #[error("user not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for user credentials.
///
/// Every operation touches a single row; uniqueness of `email` is left to
/// the backing store and surfaces as [`StoreError::Conflict`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        profile_pic: Option<&str>,
    ) -> Result<Uuid, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<UserRecord, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<UserRecord, StoreError>;
}

/// Postgres-backed credential store
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        profile_pic: Option<&str>,
    ) -> Result<Uuid, StoreError> {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (email, password_hash, profile_pic)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(profile_pic)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<UserRecord, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, password_hash, profile_pic, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<UserRecord, StoreError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, password_hash, profile_pic, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return StoreError::Conflict;
        }
    }
    StoreError::Database(e)
}
