//! Route definitions for the Aphid API
//!
//! This module organizes all API routes and applies middleware.

use crate::auth::require_auth;
use crate::state::AppState;
use axum::{
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod auth;
mod health;
mod posts;


/// Headroom over the upload limit for the rest of a multipart body
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    let limit = body_limit(&state);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .nest("/api", api_routes(&state))
        // Apply middleware layers
        .layer(RequestBodyLimitLayer::new(limit))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Largest accepted request body: one full-size image plus the other form fields
fn body_limit(state: &AppState) -> usize {
    state.config().storage.max_upload_bytes + BODY_LIMIT_SLACK
}

/// Routes under /api
///
/// Everything in `protected` passes through `require_auth` before its
/// handler is called.
fn api_routes(state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(posts::protected_routes(body_limit(state)))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", get(|| async { "Aphid API" }))
        .merge(auth::public_routes())
        .merge(posts::public_routes())
        .merge(protected)
}
