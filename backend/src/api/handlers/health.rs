//! Health check endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::api::SharedState;

#[derive(OpenApi)]
#[openapi(
    paths(health_check, readiness_check),
    components(schemas(HealthResponse, HealthChecks, CheckStatus)),
    tags((name = "health", description = "Health and readiness checks")),
)]
pub struct HealthApiDoc;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    pub database: CheckStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckStatus {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Liveness check. Always 200 while the process is serving; a failing
/// store is reported as `degraded` so the tracker keeps accepting traffic.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Service is alive", body = HealthResponse)),
)]
pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    let database = match state.store.ping().await {
        Ok(()) => CheckStatus {
            status: "healthy".to_string(),
            backend: state.store.backend_name().to_string(),
            message: None,
        },
        Err(e) => CheckStatus {
            status: "unhealthy".to_string(),
            backend: state.store.backend_name().to_string(),
            message: Some(e.to_string()),
        },
    };

    let status = if database.status == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks { database },
    })
}

/// Readiness check: 200 only when the store accepts writes.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Ready to record downloads"),
        (status = 503, description = "Store unavailable"),
    ),
)]
pub async fn readiness_check(State(state): State<SharedState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
