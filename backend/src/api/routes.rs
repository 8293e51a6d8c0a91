//! Route definitions for the API.

use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, Method},
    middleware,
    routing::get,
    Json, Router,
};
use tower::ServiceExt;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::handlers;
use super::middleware::correlation::correlation_id_middleware;
use super::SharedState;
use crate::config::Config;

/// Tracking payloads are a few short strings.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config);
    let plain = api_router(state);
    let with_cors = plain.clone().layer(cors);

    // CorsLayer answers every OPTIONS itself; only real preflights may
    // bypass the handlers, a bare OPTIONS still gets its 405.
    Router::new().fallback_service(tower::service_fn(move |req: Request| {
        let target = if req.method() == Method::OPTIONS && !is_cors_preflight(&req) {
            plain.clone()
        } else {
            with_cors.clone()
        };
        target.oneshot(req)
    }))
}

/// OPTIONS carrying both `Origin` and `Access-Control-Request-Method`.
fn is_cors_preflight(req: &Request) -> bool {
    req.method() == Method::OPTIONS
        && req.headers().contains_key(header::ORIGIN)
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

fn api_router(state: SharedState) -> Router {
    // Build the OpenAPI document once at startup
    let openapi = super::openapi::build_openapi();

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/healthz", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/readyz", get(handlers::health::readiness_check))
        .route(
            "/api/openapi.json",
            get(move || async move { Json(openapi) }),
        )
        .merge(handlers::downloads::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(correlation_id_middleware))
        .with_state(state)
}

/// The website posts cross-origin when the tracker is hosted separately.
/// With no configured origins any origin may call it; the endpoint holds
/// no credentials.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origin = if config.cors_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(config.cors_origins.clone())
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
