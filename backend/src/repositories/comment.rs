//! Comment repository for database operations

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Comment joined with its author's profile picture
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub user_profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Foreign keys on `comments`, named in the initial migration
const POST_FK: &str = "comments_post_id_fkey";
const AUTHOR_FK: &str = "comments_user_id_fkey";

/// Result of inserting a comment
#[derive(Debug, Clone)]
pub enum CommentInsert {
    Created(CommentRecord),
    /// The post does not exist (or was deleted meanwhile)
    PostMissing,
    /// The commenter's user row is gone although their token is still valid
    AuthorMissing,
}

/// Which parent row a violated foreign key points at
fn missing_parent(constraint: Option<&str>) -> Option<CommentInsert> {
    match constraint {
        Some(POST_FK) => Some(CommentInsert::PostMissing),
        Some(AUTHOR_FK) => Some(CommentInsert::AuthorMissing),
        _ => None,
    }
}

/// Comment repository for database operations
pub struct CommentRepository;

impl CommentRepository {
    /// Insert a comment, reporting a missing post or author separately
    pub async fn create(
        pool: &PgPool,
        post_id: Uuid,
        user_id: Uuid,
        text: &str,
    ) -> Result<CommentInsert> {
        let result = sqlx::query_as::<_, CommentRecord>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, user_id, text)
                VALUES ($1, $2, $3)
                RETURNING id, post_id, user_id, text, created_at
            )
            SELECT i.id, i.post_id, i.user_id, i.text,
                   u.profile_pic AS user_profile_pic, i.created_at
            FROM inserted i
            JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(text)
        .fetch_one(pool)
        .await;

        match result {
            Ok(record) => Ok(CommentInsert::Created(record)),
            Err(sqlx::Error::Database(db_err)) => {
                if db_err.is_foreign_key_violation() {
                    if let Some(outcome) = missing_parent(db_err.constraint()) {
                        return Ok(outcome);
                    }
                }
                Err(sqlx::Error::Database(db_err).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All comments on the given posts, oldest first
    pub async fn list_for_posts(pool: &PgPool, post_ids: &[Uuid]) -> Result<Vec<CommentRecord>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let records = sqlx::query_as::<_, CommentRecord>(
            r#"
            SELECT c.id, c.post_id, c.user_id, c.text,
                   u.profile_pic AS user_profile_pic, c.created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.post_id = ANY($1)
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(post_ids)
        .fetch_all(pool)
        .await?;

        Ok(records)
    }
}
