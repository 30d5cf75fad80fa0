//! Embedded schema migrations.

use sqlx::PgPool;

use boxoffice_core::error::{AppError, ErrorKind};
use boxoffice_core::result::AppResult;

/// Run all pending migrations from the embedded `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Migration failed", e))
}
