//! Post and comment routes

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::{NewPost, PostService};
use crate::state::AppState;
use aphid_shared::models::PostCategory;
use aphid_shared::types::{CommentResponse, CreateCommentRequest, PostListQuery, PostResponse};
use aphid_shared::validation::{image_extension, parse_tags};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

/// Routes reachable without a token
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/:id", get(get_post))
}

/// Routes that require a bearer token
///
/// `body_limit` caps the whole multipart form; the image inside it is
/// checked against `storage.max_upload_bytes` separately.
pub fn protected_routes(body_limit: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/posts",
            post(create_post).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/posts/:id", delete(delete_post))
        .route("/comments", post(create_comment))
}

/// GET /api/posts - Posts with their comments, newest first
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> ApiResult<Json<Vec<PostResponse>>> {
    let posts = PostService::list(state.db(), &query).await?;
    Ok(Json(posts))
}

/// GET /api/posts/:id
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PostResponse>> {
    let post = PostService::get(state.db(), id).await?;
    Ok(Json(post))
}

/// Raw multipart fields of a new post
#[derive(Default)]
struct PostForm {
    category: Option<String>,
    tags: Option<String>,
    title: Option<String>,
    text: Option<String>,
    /// (extension, bytes)
    image: Option<(String, Vec<u8>)>,
}

/// Keep the status axum assigns, so an over-long body is a 413
fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(e.body_text())
    }
}

impl PostForm {
    async fn read(multipart: &mut Multipart, max_image_bytes: usize) -> Result<Self, ApiError> {
        let mut form = PostForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    // Browsers send an empty part when no file was chosen
                    if bytes.is_empty() {
                        continue;
                    }
                    if bytes.len() > max_image_bytes {
                        return Err(ApiError::PayloadTooLarge(format!(
                            "Image exceeds {} bytes",
                            max_image_bytes
                        )));
                    }
                    let ext = image_extension(&filename).ok_or_else(|| {
                        ApiError::Validation("Image must be png, jpg, jpeg or gif".to_string())
                    })?;
                    form.image = Some((ext, bytes.to_vec()));
                }
                "category" | "tags" | "title" | "text" => {
                    let value = field.text().await.map_err(multipart_error)?;
                    match name.as_str() {
                        "category" => form.category = Some(value),
                        "tags" => form.tags = Some(value),
                        "title" => form.title = Some(value),
                        _ => form.text = Some(value),
                    }
                }
                // Older clients also send user_id; the author comes from the token
                _ => {}
            }
        }

        Ok(form)
    }

    fn into_new_post(self) -> Result<(NewPost, Option<(String, Vec<u8>)>), ApiError> {
        let category = self
            .category
            .ok_or_else(|| ApiError::Validation("category is required".to_string()))?
            .parse::<PostCategory>()
            .map_err(ApiError::Validation)?;
        let tags = parse_tags(self.tags.as_deref().unwrap_or_default())
            .map_err(ApiError::Validation)?;

        let post = NewPost {
            title: self.title.unwrap_or_default(),
            text: self.text.unwrap_or_default(),
            category,
            tags,
            image: None,
        };
        post.validate()?;
        Ok((post, self.image))
    }
}

/// POST /api/posts - Create a post (multipart form)
async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<PostResponse>)> {
    let max_image_bytes = state.config().storage.max_upload_bytes;
    let (mut post, image) = PostForm::read(&mut multipart, max_image_bytes)
        .await?
        .into_new_post()?;

    if let Some((ext, bytes)) = image {
        let name = state
            .uploads
            .save(&ext, &bytes)
            .await
            .map_err(ApiError::Internal)?;
        post.image = Some(name);
    }

    let stored_image = post.image.clone();
    match PostService::create(state.db(), state.responder(), auth.user_id, post).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(created))),
        Err(e) => {
            if let Some(name) = stored_image {
                state.uploads.remove(&name).await;
            }
            Err(e)
        }
    }
}

/// DELETE /api/posts/:id - Delete one of your own posts
async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    PostService::delete(state.db(), id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/comments - Comment on a post
async fn create_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    let comment = PostService::add_comment(state.db(), auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
