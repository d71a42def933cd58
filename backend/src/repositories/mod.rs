//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod comment;
pub mod post;
pub mod user;

pub use comment::{CommentInsert, CommentRecord, CommentRepository};
pub use post::{CreatePost, DeleteOutcome, PostRecord, PostRepository};
pub use user::{CredentialStore, PgCredentialStore, StoreError, UserRecord};
