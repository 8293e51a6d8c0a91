//! Download event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// A persisted download intent signal. Rows are append-only.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct DownloadEvent {
    pub id: Uuid,
    pub file: String,
    pub platform: String,
    pub version: Option<String>,
    /// Assigned by the server at insert time.
    pub downloaded_at: DateTime<Utc>,
}

/// Body of `POST /api/track-download`.
///
/// Unknown fields (including any client-side timestamp) are ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DownloadPayload {
    /// Installer or archive file name
    #[schema(example = "Groot2-v1.6.1-windows-installer.exe")]
    pub file: Option<String>,
    /// Target OS/architecture
    #[schema(example = "windows")]
    pub platform: Option<String>,
    /// Release label, if the page knows it
    #[schema(example = "1.6.1")]
    pub version: Option<String>,
}

impl DownloadPayload {
    /// Parse a raw request body. Anything other than a JSON object whose
    /// known fields are strings (or null) is rejected.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| AppError::InvalidPayload(e.to_string()))?;

        if !value.is_object() {
            return Err(AppError::InvalidPayload(
                "expected a JSON object".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(|e| AppError::InvalidPayload(e.to_string()))
    }

    /// Check required fields and normalize into an insertable event.
    pub fn into_new_event(self) -> Result<NewDownloadEvent> {
        NewDownloadEvent::new(
            self.file.unwrap_or_default(),
            self.platform.unwrap_or_default(),
            self.version,
        )
    }
}

/// A validated download event that has not been stored yet.
///
/// Only constructible through [`NewDownloadEvent::new`], so `file` and
/// `platform` are always non-empty and no field contains a NUL character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDownloadEvent {
    file: String,
    platform: String,
    version: Option<String>,
}

impl NewDownloadEvent {
    pub fn new(
        file: impl Into<String>,
        platform: impl Into<String>,
        version: Option<String>,
    ) -> Result<Self> {
        let file = file.into();
        let platform = platform.into();

        if file.is_empty() {
            return Err(AppError::MissingRequiredField("file"));
        }
        if platform.is_empty() {
            return Err(AppError::MissingRequiredField("platform"));
        }
        // PostgreSQL TEXT cannot hold U+0000.
        for (name, value) in [
            ("file", Some(file.as_str())),
            ("platform", Some(platform.as_str())),
            ("version", version.as_deref()),
        ] {
            if value.is_some_and(|v| v.contains('\0')) {
                return Err(AppError::InvalidPayload(format!(
                    "{name} contains a NUL character"
                )));
            }
        }

        Ok(Self {
            file,
            platform,
            // An empty label carries no information; store NULL.
            version: version.filter(|v| !v.is_empty()),
        })
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Stamp the event with an id and server time.
    pub fn into_event(self, downloaded_at: DateTime<Utc>) -> DownloadEvent {
        DownloadEvent {
            id: Uuid::new_v4(),
            file: self.file,
            platform: self.platform,
            version: self.version,
            downloaded_at,
        }
    }
}
