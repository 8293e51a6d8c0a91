//! Per-request correlation IDs.
//!
//! Each request runs inside an `http_request` span tagged with a correlation
//! ID, so the store insert and any error log line can be tied back to the
//! browser call that triggered them. The ID is echoed in the response.

use axum::{
    extract::Request,
    http::{header::HeaderValue, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::fmt;
use tracing::Instrument;
use uuid::Uuid;

/// The header name for correlation IDs.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// W3C Trace Context header.
const TRACEPARENT_HEADER: &str = "traceparent";

/// Longest client-supplied ID we are willing to log.
const MAX_CORRELATION_ID_LEN: usize = 128;

/// Correlation ID attached to request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Pick an ID from request headers: an explicit `X-Correlation-ID`, then
    /// the trace-id of a well-formed `traceparent`, else a fresh UUID.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty() && s.len() <= MAX_CORRELATION_ID_LEN)
            .map(|s| Self(s.to_string()))
            .or_else(|| {
                headers
                    .get(TRACEPARENT_HEADER)
                    .and_then(|h| h.to_str().ok())
                    .and_then(trace_id_from_traceparent)
                    .map(|id| Self(id.to_string()))
            })
            .unwrap_or_else(Self::generate)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `version-traceid-parentid-flags`; the trace-id is 32 lowercase hex
/// characters and must not be all zeros.
fn trace_id_from_traceparent(traceparent: &str) -> Option<&str> {
    let trace_id = traceparent.split('-').nth(1)?;
    let well_formed = trace_id.len() == 32
        && trace_id
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        && trace_id.bytes().any(|b| b != b'0');
    well_formed.then_some(trace_id)
}

pub async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = CorrelationId::from_headers(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    request.extensions_mut().insert(correlation_id.clone());

    let span = tracing::info_span!(
        "http_request",
        correlation_id = %correlation_id,
        method = %method,
        path = %path,
    );

    async move {
        let mut response = next.run(request).await;

        if let Ok(value) = HeaderValue::from_str(correlation_id.as_str()) {
            response.headers_mut().insert(CORRELATION_ID_HEADER, value);
        }

        tracing::debug!(status = response.status().as_u16(), "Request completed");
        response
    }
    .instrument(span)
    .await
}
