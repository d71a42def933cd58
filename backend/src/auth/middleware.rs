//! Authentication middleware
//!
//! A protected request moves through four states:
//! no header → parsing `Bearer <token>` → verifying the token → authorized.
//! Each failing state has its own [`AuthFailure`], which is logged and then
//! collapsed into one 401 response.
//!
//! The credential store is never consulted here. The token alone names the
//! user, so a deleted account stays usable until its token expires.

use super::jwt::TokenService;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{FromRef, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Why a protected request was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("missing_token")]
    MissingToken,
    #[error("malformed_header")]
    MalformedHeader,
    #[error("invalid_or_expired")]
    InvalidOrExpired,
}

/// Authenticated user extracted from the bearer token
///
/// Lives only as long as the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Run the header → token → user id state machine
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthUser, AuthFailure> {
    let header = headers.get(AUTHORIZATION).ok_or(AuthFailure::MissingToken)?;
    let token = bearer_token(header)?;

    let user_id = tokens.verify(token).map_err(|e| {
        debug!(kind = %e.kind, "Bearer token rejected");
        AuthFailure::InvalidOrExpired
    })?;

    Ok(AuthUser { user_id })
}

/// Extract the token from a `Bearer <token>` header value
fn bearer_token(value: &HeaderValue) -> Result<&str, AuthFailure> {
    let raw = value.to_str().map_err(|_| AuthFailure::MalformedHeader)?;
    let token = raw
        .strip_prefix("Bearer ")
        .ok_or(AuthFailure::MalformedHeader)?;

    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(AuthFailure::MalformedHeader);
    }
    Ok(token)
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already resolved by `require_auth` on this route
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(*user);
        }

        let app_state = AppState::from_ref(state);
        Ok(authenticate(&parts.headers, app_state.tokens())?)
    }
}

/// Route layer that rejects unauthenticated requests before the handler runs
///
/// On success the resolved [`AuthUser`] is stored in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(request.headers(), state.tokens())?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
