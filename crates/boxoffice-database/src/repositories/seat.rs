//! Seat repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use boxoffice_core::error::{AppError, ErrorKind};
use boxoffice_core::result::AppResult;
use boxoffice_entity::repository::SeatRepository;
use boxoffice_entity::seat::{Seat, SeatStatus};

/// Postgres-backed seat repository.
#[derive(Debug, Clone)]
pub struct PgSeatRepository {
    pool: PgPool,
}

impl PgSeatRepository {
    /// Create a new seat repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SeatRepository for PgSeatRepository {
    async fn find_by_ids(&self, event_id: i64, seat_ids: &[Uuid]) -> AppResult<Vec<Seat>> {
        sqlx::query_as::<_, Seat>("SELECT * FROM seats WHERE event_id = $1 AND id = ANY($2)")
            .bind(event_id)
            .bind(seat_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find seats", e))
    }

    async fn count_available(&self, event_id: i64) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM seats WHERE event_id = $1 AND status = 'AVAILABLE'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count available seats", e)
        })
    }

    async fn update_status(&self, seat_ids: &[Uuid], status: SeatStatus) -> AppResult<u64> {
        let result = sqlx::query("UPDATE seats SET status = $1 WHERE id = ANY($2)")
            .bind(status)
            .bind(seat_ids)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update seat status", e)
            })?;
        Ok(result.rows_affected())
    }
}
