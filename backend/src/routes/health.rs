//! Health check endpoints
//!
//! - /health - Basic health check
//! - /health/ready - Readiness probe (database reachable)
//! - /health/live - Liveness probe (always OK while the process serves)

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

impl HealthResponse {
    fn bare(status: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            checks: None,
        }
    }
}

/// Individual readiness checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
    /// Informational only; a disabled responder does not fail readiness
    pub ai_responder: CheckStatus,
}

/// Status of an individual check
#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Basic health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::bare("healthy"))
}

/// Readiness probe. Returns 503 while the database is unreachable.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = match db::health_check(state.db()).await {
        Ok(()) => CheckStatus {
            status: "healthy",
            message: None,
        },
        // The error text stays in the logs (db::health_check warns)
        Err(_) => CheckStatus {
            status: "unhealthy",
            message: Some("database unreachable".to_string()),
        },
    };
    let ai_responder = CheckStatus {
        status: if state.config().ai.enabled { "enabled" } else { "disabled" },
        message: None,
    };

    let is_ready = database.status == "healthy";
    let response = HealthResponse {
        status: if is_ready { "ready" } else { "not_ready" },
        version: env!("CARGO_PKG_VERSION"),
        checks: Some(HealthChecks {
            database,
            ai_responder,
        }),
    };

    if is_ready {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Liveness probe
pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse::bare("alive"))
}
