//! API request and response types

use crate::models::PostCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page size for post listings
pub const DEFAULT_PAGE_LIMIT: i64 = 50;
/// Largest page a client may request
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by both register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub token: String,
}

/// User profile response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A comment as rendered under its post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    /// Profile picture of the commenter, if they have one
    pub user_profile_pic: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A post with its comments, oldest comment first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub text: String,
    pub category: PostCategory,
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub ai_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub comments: Vec<CommentResponse>,
}

/// Comment creation request
///
/// The author is taken from the bearer token; any `user_id` sent by older
/// clients is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    pub post_id: Uuid,
    pub text: String,
}

/// Query parameters for listing posts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PostListQuery {
    /// Clamp to sane bounds, returning `(limit, offset)`
    pub fn normalize(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}
