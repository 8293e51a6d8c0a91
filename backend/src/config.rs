//! Application configuration loaded from environment variables.

use axum::http::HeaderValue;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, Result};

/// Where download events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// PostgreSQL at `DATABASE_URL` (default)
    Postgres,
    /// Process memory; events are lost on restart. Local development only.
    Memory,
}

impl FromStr for StoreKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Config(format!(
                "DOWNLOAD_STORE must be \"postgres\" or \"memory\", got {other:?}"
            ))),
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    /// Download store backend
    pub download_store: StoreKind,

    /// Database connection URL. Required unless `download_store` is `Memory`.
    pub database_url: Option<String>,

    /// Server bind address (host:port)
    pub bind_address: String,

    /// Maximum pooled database connections
    pub database_max_connections: u32,

    /// How long an insert may wait for a pooled connection
    pub database_acquire_timeout: Duration,

    /// Origins allowed to call the API from a browser. Empty means any origin.
    pub cors_origins: Vec<HeaderValue>,

    /// OTLP collector endpoint (optional)
    pub otel_endpoint: Option<String>,

    /// Service name reported to the tracing backend
    pub service_name: String,
}

redacted_debug!(Config {
    show download_store,
    redact_option database_url,
    show bind_address,
    show database_max_connections,
    show database_acquire_timeout,
    show cors_origins,
    show otel_endpoint,
    show service_name,
});

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let download_store = match non_empty("DOWNLOAD_STORE") {
            Some(raw) => raw.parse()?,
            None => StoreKind::Postgres,
        };
        let database_url = non_empty("DATABASE_URL");
        if download_store == StoreKind::Postgres && database_url.is_none() {
            return Err(AppError::Config("DATABASE_URL not set".into()));
        }

        Ok(Self {
            download_store,
            database_url,
            bind_address: non_empty("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".into()),
            database_max_connections: non_empty("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            database_acquire_timeout: Duration::from_secs(
                non_empty("DATABASE_ACQUIRE_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            ),
            cors_origins: parse_origins(non_empty("CORS_ORIGINS").as_deref())?,
            otel_endpoint: non_empty("OTEL_EXPORTER_OTLP_ENDPOINT"),
            service_name: non_empty("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| "download-tracker".into()),
        })
    }
}

fn parse_origins(raw: Option<&str>) -> Result<Vec<HeaderValue>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| AppError::Config(format!("invalid CORS origin: {origin:?}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    const POSTGRES: (&str, &str) = ("DATABASE_URL", "postgres://u:p@db/downloads");

    #[test]
    fn test_defaults() {
        let config = config_from(&[POSTGRES]).unwrap();
        assert_eq!(config.download_store, StoreKind::Postgres);
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.database_acquire_timeout, Duration::from_secs(5));
        assert!(config.cors_origins.is_empty());
        assert!(config.otel_endpoint.is_none());
        assert_eq!(config.service_name, "download-tracker");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://u:p@db/downloads"),
            ("BIND_ADDRESS", "127.0.0.1:9000"),
            ("DATABASE_MAX_CONNECTIONS", "3"),
            ("DATABASE_ACQUIRE_TIMEOUT_SECS", "2"),
            ("CORS_ORIGINS", "https://www.behaviortree.dev, https://example.org"),
        ])
        .unwrap();
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://u:p@db/downloads")
        );
        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.database_max_connections, 3);
        assert_eq!(config.database_acquire_timeout, Duration::from_secs(2));
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.cors_origins[1], "https://example.org");
    }

    #[test]
    fn test_unparseable_numbers_fall_back() {
        let config = config_from(&[
            POSTGRES,
            ("DATABASE_MAX_CONNECTIONS", "many"),
            ("DATABASE_ACQUIRE_TIMEOUT_SECS", "-1"),
        ])
        .unwrap();
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.database_acquire_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_database_url_fails() {
        let err = config_from(&[]).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg == "DATABASE_URL not set"));

        let err = config_from(&[("DATABASE_URL", "  ")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let err = config_from(&[("DOWNLOAD_STORE", "postgres")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_memory_store_is_explicit_opt_in() {
        let config = config_from(&[("DOWNLOAD_STORE", "Memory")]).unwrap();
        assert_eq!(config.download_store, StoreKind::Memory);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_unknown_store_kind_is_config_error() {
        let err = config_from(&[POSTGRES, ("DOWNLOAD_STORE", "sqlite")]).unwrap_err();
        assert!(matches!(err, AppError::Config(ref msg) if msg.contains("sqlite")));
    }

    #[test]
    fn test_invalid_cors_origin_is_config_error() {
        let err = config_from(&[POSTGRES, ("CORS_ORIGINS", "https://ok.dev,bad\norigin")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = config_from(&[("DATABASE_URL", "postgres://user:secret@db/x")]).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
