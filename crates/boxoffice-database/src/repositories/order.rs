//! Order repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use boxoffice_core::error::{AppError, ErrorKind};
use boxoffice_core::result::AppResult;
use boxoffice_entity::order::{Order, OrderStatus};
use boxoffice_entity::repository::OrderRepository;
use boxoffice_entity::seat::SeatStatus;

/// Postgres-backed order repository.
#[derive(Debug, Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Create a new order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn insert(&self, order: &Order) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO orders (id, user_id, event_id, seat_ids, total_amount, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.event_id)
        .bind(&order.seat_ids)
        .bind(order.total_amount)
        .bind(order.status)
        .bind(order.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert order", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find order", e))
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> AppResult<bool> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2 AND status = $3")
            .bind(to)
            .bind(id)
            .bind(from)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update order status", e)
            })?;
        Ok(result.rows_affected() == 1)
    }

    async fn cancel_pending(&self, id: Uuid, seat_ids: &[Uuid]) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin cancellation", e)
        })?;

        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2 AND status = $3")
            .bind(OrderStatus::Cancelled)
            .bind(id)
            .bind(OrderStatus::Pending)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to cancel order", e)
            })?;

        // Dropping the transaction rolls it back.
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE seats SET status = $1 WHERE id = ANY($2)")
            .bind(SeatStatus::Available)
            .bind(seat_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to restore seats", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit cancellation", e)
        })?;
        Ok(true)
    }
}
