//! Repository contracts for the durable store.
//!
//! These traits are the boundary to the out-of-scope persistence layer:
//! the booking core only ever sees these operations, never SQL. Concrete
//! sqlx implementations live in `boxoffice-database`.

use async_trait::async_trait;
use uuid::Uuid;

use boxoffice_core::result::AppResult;

use crate::order::{Order, OrderStatus};
use crate::seat::{Seat, SeatStatus};

/// Durable order access.
#[async_trait]
pub trait OrderRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Persist a new order.
    async fn insert(&self, order: &Order) -> AppResult<()>;

    /// Find an order by identifier.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;

    /// Conditionally transition an order's status. Returns `true` only if
    /// the order existed and was still in `from`. This is the idempotency
    /// guard both the confirmation path and the expiry compensator rely on.
    async fn transition_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> AppResult<bool>;

    /// Cancel a PENDING order and restore its seats to AVAILABLE as one
    /// durable transaction, so a crash cannot leave the order cancelled
    /// with its seats still held. Returns `true` only if the order was
    /// still PENDING; `false` means another path already resolved it and
    /// nothing was changed.
    async fn cancel_pending(&self, id: Uuid, seat_ids: &[Uuid]) -> AppResult<bool>;
}

/// Durable seat access.
#[async_trait]
pub trait SeatRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch the given seats of an event.
    async fn find_by_ids(&self, event_id: i64, seat_ids: &[Uuid]) -> AppResult<Vec<Seat>>;

    /// Count an event's seats currently in AVAILABLE status. Feeds the
    /// lazy availability-counter warm.
    async fn count_available(&self, event_id: i64) -> AppResult<i64>;

    /// Set the status of the given seats. Returns the number updated.
    async fn update_status(&self, seat_ids: &[Uuid], status: SeatStatus) -> AppResult<u64>;
}
