//! Database connection pool setup.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;

/// Create a new database connection pool
pub async fn create_pool(database_url: &str, config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(1)
        .acquire_timeout(config.database_acquire_timeout)
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Apply pending schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
