//! Posts and comments
//!
//! Question posts are sent to the AI responder before they are stored. The
//! responder is best effort: if it fails the post is saved without an answer.

use crate::error::ApiError;
use crate::repositories::{
    CommentInsert, CommentRecord, CommentRepository, CreatePost, DeleteOutcome, PostRecord, PostRepository,
};
use crate::services::ai::{AiResponder, ResponderError};
use aphid_shared::models::PostCategory;
use aphid_shared::types::{CommentResponse, CreateCommentRequest, PostListQuery, PostResponse};
use aphid_shared::validation::{validate_comment_text, validate_post_text, validate_title};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Validated input for a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    pub category: PostCategory,
    pub tags: Vec<String>,
    /// Stored filename of an already-saved image
    pub image: Option<String>,
}

impl NewPost {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_title(&self.title).map_err(ApiError::Validation)?;
        validate_post_text(&self.text).map_err(ApiError::Validation)?;
        Ok(())
    }
}

/// Post service
pub struct PostService;

impl PostService {
    /// Store a post, answering it first when it is a question
    pub async fn create(
        pool: &PgPool,
        responder: &dyn AiResponder,
        user_id: Uuid,
        post: NewPost,
    ) -> Result<PostResponse, ApiError> {
        post.validate()?;

        let ai_response = Self::ai_answer(responder, &post).await;

        let record = PostRepository::create(
            pool,
            CreatePost {
                user_id,
                title: post.title.trim().to_string(),
                text: post.text,
                category: post.category.as_str().to_string(),
                tags: post.tags,
                image: post.image,
                ai_response,
            },
        )
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(author_missing)?;

        info!(post_id = %record.id, %user_id, category = %post.category, "Post created");
        to_response(record, Vec::new())
    }

    /// Ask the responder about a question post; `None` for discussions or on failure
    pub async fn ai_answer(responder: &dyn AiResponder, post: &NewPost) -> Option<String> {
        if !post.category.wants_ai_response() {
            return None;
        }
        match responder.answer(&post.title, &post.text).await {
            Ok(answer) => Some(answer),
            Err(ResponderError::Disabled) => None,
            Err(e) => {
                warn!("AI responder failed, storing post without an answer: {}", e);
                None
            }
        }
    }

    /// A page of posts, newest first, each with its comments
    pub async fn list(pool: &PgPool, query: &PostListQuery) -> Result<Vec<PostResponse>, ApiError> {
        let (limit, offset) = query.normalize();
        let posts = PostRepository::list(pool, limit, offset)
            .await
            .map_err(ApiError::Internal)?;

        let ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let comments = CommentRepository::list_for_posts(pool, &ids)
            .await
            .map_err(ApiError::Internal)?;

        assemble(posts, comments)
    }

    /// A single post with its comments
    pub async fn get(pool: &PgPool, id: Uuid) -> Result<PostResponse, ApiError> {
        let post = PostRepository::find_by_id(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

        let comments = CommentRepository::list_for_posts(pool, &[id])
            .await
            .map_err(ApiError::Internal)?;

        to_response(post, comments.into_iter().map(comment_response).collect())
    }

    /// Delete a post owned by `user_id`
    pub async fn delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
        match PostRepository::delete_owned(pool, id, user_id)
            .await
            .map_err(ApiError::Internal)?
        {
            DeleteOutcome::Deleted => {
                info!(post_id = %id, %user_id, "Post deleted");
                Ok(())
            }
            DeleteOutcome::NotFound => Err(ApiError::NotFound("Post not found".to_string())),
            DeleteOutcome::NotOwner => Err(ApiError::Forbidden(
                "Only the author can delete a post".to_string(),
            )),
        }
    }

    /// Comment on a post
    pub async fn add_comment(
        pool: &PgPool,
        user_id: Uuid,
        req: CreateCommentRequest,
    ) -> Result<CommentResponse, ApiError> {
        validate_comment_text(&req.text).map_err(ApiError::Validation)?;

        match CommentRepository::create(pool, req.post_id, user_id, req.text.trim())
            .await
            .map_err(ApiError::Internal)?
        {
            CommentInsert::Created(record) => Ok(comment_response(record)),
            CommentInsert::PostMissing => Err(ApiError::NotFound("Post not found".to_string())),
            CommentInsert::AuthorMissing => Err(author_missing()),
        }
    }
}

/// A valid token whose user row no longer exists
fn author_missing() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

/// Attach comments to their posts, keeping both orders intact
fn assemble(
    posts: Vec<PostRecord>,
    comments: Vec<CommentRecord>,
) -> Result<Vec<PostResponse>, ApiError> {
    let mut by_post: HashMap<Uuid, Vec<CommentResponse>> = HashMap::new();
    for comment in comments {
        by_post
            .entry(comment.post_id)
            .or_default()
            .push(comment_response(comment));
    }

    posts
        .into_iter()
        .map(|post| {
            let comments = by_post.remove(&post.id).unwrap_or_default();
            to_response(post, comments)
        })
        .collect()
}

fn to_response(post: PostRecord, comments: Vec<CommentResponse>) -> Result<PostResponse, ApiError> {
    let category = post
        .category
        .parse::<PostCategory>()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("post {}: {}", post.id, e)))?;

    Ok(PostResponse {
        id: post.id,
        user_id: post.user_id,
        title: post.title,
        text: post.text,
        category,
        tags: post.tags,
        image: post.image,
        ai_response: post.ai_response,
        created_at: post.created_at,
        comments,
    })
}

fn comment_response(record: CommentRecord) -> CommentResponse {
    CommentResponse {
        id: record.id,
        post_id: record.post_id,
        user_id: record.user_id,
        text: record.text,
        user_profile_pic: record.user_profile_pic,
        created_at: record.created_at,
    }
}
