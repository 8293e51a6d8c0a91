//! API module - HTTP handlers and middleware.

pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;

use std::sync::Arc;

use crate::config::Config;
use crate::services::download_service::DownloadStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn DownloadStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DownloadStore>) -> Self {
        Self { config, store }
    }
}

pub type SharedState = Arc<AppState>;
