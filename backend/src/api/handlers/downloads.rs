//! Download tracking handler.

use axum::{extract::State, http::Method, routing::any, Json, Router};
use bytes::Bytes;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::api::SharedState;
use crate::error::Result;
use crate::models::DownloadPayload;
use crate::services::download_service;

#[derive(OpenApi)]
#[openapi(
    paths(track_download),
    components(schemas(DownloadPayload, TrackDownloadResponse, TrackDownloadError)),
    tags((name = "downloads", description = "Download intent tracking")),
)]
pub struct DownloadsApiDoc;

/// Every method is routed here so non-POST requests get the documented
/// 405 body rather than axum's empty one.
pub fn router() -> Router<SharedState> {
    Router::new().route("/api/track-download", any(track_download))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackDownloadResponse {
    pub success: bool,
}

/// Shape of the JSON body sent on storage failure.
#[derive(Debug, Serialize, ToSchema)]
pub struct TrackDownloadError {
    #[schema(example = "Failed to track download")]
    pub error: String,
}

/// POST /api/track-download
#[utoipa::path(
    post,
    path = "/api/track-download",
    tag = "downloads",
    request_body = DownloadPayload,
    responses(
        (status = 200, description = "Download recorded", body = TrackDownloadResponse),
        (status = 400, description = "Missing required fields or malformed body", body = String, content_type = "text/plain"),
        (status = 405, description = "Method not allowed", body = String, content_type = "text/plain"),
        (status = 500, description = "Download could not be stored", body = TrackDownloadError),
    ),
)]
pub async fn track_download(
    State(state): State<SharedState>,
    method: Method,
    body: Bytes,
) -> Result<Json<TrackDownloadResponse>> {
    let event = download_service::record_download(state.store.as_ref(), &method, &body).await?;

    tracing::info!(
        id = %event.id,
        file = %event.file,
        platform = %event.platform,
        version = event.version.as_deref().unwrap_or(""),
        store = state.store.backend_name(),
        "Download recorded"
    );

    Ok(Json(TrackDownloadResponse { success: true }))
}
