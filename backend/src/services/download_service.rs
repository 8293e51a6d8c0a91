//! Download event recording.
//!
//! `record_download` is the whole request contract: reject anything that is
//! not a POST, parse and validate the body, then append exactly one event to
//! the injected [`DownloadStore`]. There is no retry and no deduplication;
//! the signal is best-effort telemetry.

use async_trait::async_trait;
use axum::http::Method;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{DownloadEvent, DownloadPayload, NewDownloadEvent};

/// Append-only sink for download events.
#[async_trait]
pub trait DownloadStore: Send + Sync {
    /// Persist one event, assigning its id and server-side timestamp.
    async fn insert(&self, event: &NewDownloadEvent) -> Result<DownloadEvent>;

    /// Verify the store can accept writes.
    async fn ping(&self) -> Result<()>;

    /// Short name for health output and logs.
    fn backend_name(&self) -> &'static str;
}

/// Validate a raw request and record it.
pub async fn record_download(
    store: &dyn DownloadStore,
    method: &Method,
    body: &[u8],
) -> Result<DownloadEvent> {
    if *method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    let event = DownloadPayload::from_body(body)?.into_new_event()?;
    store.insert(&event).await
}

/// PostgreSQL-backed store writing to the `downloads` table.
pub struct PgDownloadStore {
    db: PgPool,
}

impl PgDownloadStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DownloadStore for PgDownloadStore {
    async fn insert(&self, event: &NewDownloadEvent) -> Result<DownloadEvent> {
        let row = sqlx::query_as::<_, DownloadEvent>(
            r#"
            INSERT INTO downloads (id, file, platform, version, downloaded_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, file, platform, version, downloaded_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.file())
        .bind(event.platform())
        .bind(event.version())
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;

        Ok(row)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.db)
            .await
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

/// In-process store for tests and local runs without a database.
///
/// Can be switched into a failing mode to simulate an outage.
pub struct MemoryDownloadStore {
    events: RwLock<Vec<DownloadEvent>>,
    available: AtomicBool,
}

impl Default for MemoryDownloadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDownloadStore {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Toggle simulated availability.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Copy of every stored event in insertion order.
    pub async fn events(&self) -> Vec<DownloadEvent> {
        self.events.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::StorageUnavailable(
                "memory store marked unavailable".to_string(),
            ))
        }
    }
}

#[async_trait]
impl DownloadStore for MemoryDownloadStore {
    async fn insert(&self, event: &NewDownloadEvent) -> Result<DownloadEvent> {
        self.check_available()?;
        let stored = event.clone().into_event(Utc::now());
        self.events.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn ping(&self) -> Result<()> {
        self.check_available()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
