//! Download Tracker - Main Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;

use download_tracker_backend::{
    api,
    config::{Config, StoreKind},
    db,
    error::{AppError, Result},
    services::download_service::{DownloadStore, MemoryDownloadStore, PgDownloadStore},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    // Held until shutdown so pending spans are flushed
    let _otel_guard = telemetry::init_tracing(config.otel_endpoint.as_deref(), &config.service_name)?;
    tracing::info!("Starting Download Tracker");

    let store = create_store(&config).await?;
    tracing::info!(store = store.backend_name(), "Download store ready");

    let state = Arc::new(api::AppState::new(config.clone(), store));
    let app = api::routes::create_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.bind_address.parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Connect to PostgreSQL and migrate, or use the in-memory store when
/// explicitly selected with `DOWNLOAD_STORE=memory`.
async fn create_store(config: &Config) -> Result<Arc<dyn DownloadStore>> {
    match config.download_store {
        StoreKind::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| AppError::Config("DATABASE_URL not set".into()))?;
            let pool = db::create_pool(url, config).await?;
            tracing::info!("Connected to database");

            db::run_migrations(&pool).await?;
            tracing::info!("Database migrations complete");

            let store: Arc<dyn DownloadStore> = Arc::new(PgDownloadStore::new(pool));
            Ok(store)
        }
        StoreKind::Memory => {
            tracing::warn!("DOWNLOAD_STORE=memory: downloads are kept in memory and lost on restart");
            let store: Arc<dyn DownloadStore> = Arc::new(MemoryDownloadStore::new());
            Ok(store)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
