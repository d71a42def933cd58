//! Post repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Post record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub text: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub ai_response: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a post
#[derive(Debug, Clone)]
pub struct CreatePost {
    pub user_id: Uuid,
    pub title: String,
    pub text: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub ai_response: Option<String>,
}

/// Foreign key from `posts.user_id` to `users`, named in the initial migration
const AUTHOR_FK: &str = "posts_user_id_fkey";

/// Result of an owner-checked delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    NotOwner,
}

/// Post repository for database operations
pub struct PostRepository;

impl PostRepository {
    /// Create a new post. Returns `None` when the author's user row is gone.
    pub async fn create(pool: &PgPool, input: CreatePost) -> Result<Option<PostRecord>> {
        let result = sqlx::query_as::<_, PostRecord>(
            r#"
            INSERT INTO posts (user_id, title, text, category, tags, image, ai_response)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, title, text, category, tags, image, ai_response, created_at
            "#,
        )
        .bind(input.user_id)
        .bind(&input.title)
        .bind(&input.text)
        .bind(&input.category)
        .bind(&input.tags)
        .bind(&input.image)
        .bind(&input.ai_response)
        .fetch_one(pool)
        .await;

        match result {
            Ok(record) => Ok(Some(record)),
            Err(sqlx::Error::Database(db_err))
                if db_err.is_foreign_key_violation() && db_err.constraint() == Some(AUTHOR_FK) =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Newest posts first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<PostRecord>> {
        let records = sqlx::query_as::<_, PostRecord>(
            r#"
            SELECT id, user_id, title, text, category, tags, image, ai_response, created_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }

    /// Find post by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<PostRecord>> {
        let record = sqlx::query_as::<_, PostRecord>(
            r#"
            SELECT id, user_id, title, text, category, tags, image, ai_response, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Delete a post if `user_id` owns it. Comments go with it (ON DELETE CASCADE).
    pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<DeleteOutcome> {
        let mut tx = pool.begin().await?;

        let owner = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id FROM posts WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match owner {
            None => DeleteOutcome::NotFound,
            Some(owner) if owner != user_id => DeleteOutcome::NotOwner,
            Some(_) => {
                sqlx::query("DELETE FROM posts WHERE id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                DeleteOutcome::Deleted
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }
}
