//! Database connection pool construction.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use boxoffice_core::config::DatabaseConfig;
use boxoffice_core::error::{AppError, ErrorKind};
use boxoffice_core::result::AppResult;

/// Create a PostgreSQL connection pool from configuration.
pub async fn create_pool(config: &DatabaseConfig) -> AppResult<PgPool> {
    info!(
        max = config.max_connections,
        min = config.min_connections,
        "Creating database connection pool"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .connect(&config.url)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to connect to Postgres", e))
}
