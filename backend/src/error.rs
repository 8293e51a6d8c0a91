//! Application error types and result alias.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application result type alias
pub type Result<T> = std::result::Result<T, AppError>;

/// Body text for requests that are not POST.
pub const METHOD_NOT_ALLOWED_BODY: &str = "Method not allowed";

/// Body text for payloads missing `file` or `platform`.
pub const MISSING_FIELDS_BODY: &str = "Missing required fields";

/// Body text for payloads that are not a JSON object of strings.
pub const INVALID_PAYLOAD_BODY: &str = "Invalid request body";

/// Error message returned as JSON when a download could not be stored.
pub const TRACKING_FAILED_MESSAGE: &str = "Failed to track download";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Request used a method other than POST
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Body missing, not JSON, or not the expected shape
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// `file` or `platform` absent or empty
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// The download store rejected or could not complete the insert
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Tracing/exporter setup error
    #[error("Telemetry error: {0}")]
    Telemetry(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Address parse error
    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::InvalidPayload(_) | AppError::MissingRequiredField(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Download tracking error");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Rejected download signal");
        }

        match self {
            AppError::MethodNotAllowed => (
                status,
                [(header::ALLOW, "POST")],
                METHOD_NOT_ALLOWED_BODY,
            )
                .into_response(),
            AppError::InvalidPayload(_) => (status, INVALID_PAYLOAD_BODY).into_response(),
            AppError::MissingRequiredField(_) => (status, MISSING_FIELDS_BODY).into_response(),
            AppError::StorageUnavailable(_) | AppError::Database(_) => {
                (status, Json(json!({ "error": TRACKING_FAILED_MESSAGE }))).into_response()
            }
            _ => (status, Json(json!({ "error": "Internal server error" }))).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_method_not_allowed_response() {
        let resp = AppError::MethodNotAllowed.into_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers().get(header::ALLOW).unwrap(), "POST");
        assert_eq!(body_string(resp).await, "Method not allowed");
    }

    #[tokio::test]
    async fn test_missing_field_response_is_plain_text() {
        let resp = AppError::MissingRequiredField("file").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().starts_with("text/plain"));
        assert_eq!(body_string(resp).await, "Missing required fields");
    }

    #[tokio::test]
    async fn test_invalid_payload_response() {
        let resp = AppError::InvalidPayload("EOF while parsing".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(resp).await, "Invalid request body");
    }

    #[tokio::test]
    async fn test_storage_unavailable_hides_cause() {
        let resp = AppError::StorageUnavailable("connection refused".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body, json!({ "error": "Failed to track download" }));
    }

    #[tokio::test]
    async fn test_database_error_maps_like_storage_failure() {
        let resp = AppError::Database(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body["error"], "Failed to track download");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Config("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::InvalidPayload("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
