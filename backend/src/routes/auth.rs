//! Authentication routes
//!
//! Registration and login are public; `/me` sits behind the auth layer.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use aphid_shared::types::{AuthResponse, LoginRequest, RegisterRequest, UserProfile};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

/// Routes reachable without a token
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Routes that require a bearer token
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_profile))
}

/// Register a new user
///
/// POST /api/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let response = UserService::register(
        state.users(),
        state.tokens(),
        &state.profile_pics,
        &req.email,
        &req.password,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password
///
/// POST /api/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response =
        UserService::login(state.users(), state.tokens(), &req.email, &req.password).await?;
    Ok(Json(response))
}

/// Get current user profile
///
/// GET /api/me
async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let profile = UserService::get_profile(state.users(), auth_user.user_id).await?;
    Ok(Json(profile))
}
