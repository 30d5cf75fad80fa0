//! Confirming a PENDING reservation.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use boxoffice_core::error::AppError;
use boxoffice_core::events::TOPIC_ORDERS;
use boxoffice_core::events::order::OrderConfirmed;
use boxoffice_core::keys;
use boxoffice_core::result::AppResult;
use boxoffice_core::traits::{CoordinationStore, EventBus};
use boxoffice_entity::order::{Order, OrderStatus};
use boxoffice_entity::repository::{OrderRepository, SeatRepository};
use boxoffice_entity::seat::SeatStatus;

/// Confirms reservations once payment has arrived.
///
/// The conditional PENDING→CONFIRMED transition is the arbiter of the
/// race against the expiry compensator: whichever side transitions first
/// wins, and the loser backs off without touching anything.
#[derive(Debug, Clone)]
pub struct ConfirmationService {
    /// Coordination store holding the expiry markers.
    store: Arc<dyn CoordinationStore>,
    /// Event bus for confirmation announcements.
    bus: Arc<dyn EventBus>,
    /// Durable orders.
    orders: Arc<dyn OrderRepository>,
    /// Durable seats.
    seats: Arc<dyn SeatRepository>,
}

impl ConfirmationService {
    /// Creates a new confirmation service.
    pub fn new(
        store: Arc<dyn CoordinationStore>,
        bus: Arc<dyn EventBus>,
        orders: Arc<dyn OrderRepository>,
        seats: Arc<dyn SeatRepository>,
    ) -> Self {
        Self {
            store,
            bus,
            orders,
            seats,
        }
    }

    /// Confirm a PENDING order, marking its seats sold.
    pub async fn confirm(&self, order_id: Uuid) -> AppResult<Order> {
        let Some(mut order) = self.orders.find_by_id(order_id).await? else {
            return Err(AppError::not_found(format!("Order {order_id} not found")));
        };

        let transitioned = self
            .orders
            .transition_status(order_id, OrderStatus::Pending, OrderStatus::Confirmed)
            .await?;
        if !transitioned {
            return Err(AppError::conflict(format!(
                "Order {order_id} is no longer awaiting confirmation"
            )));
        }

        // Disarm the expiry marker. It may already have fired; the
        // compensator's own conditional transition handles that race.
        if !self.store.remove_marker(&keys::order_expiry(order_id)).await? {
            warn!(order_id = %order_id, "Expiry marker already gone at confirmation");
        }

        self.seats
            .update_status(&order.seat_ids, SeatStatus::Sold)
            .await?;

        let confirmed = serde_json::to_string(&OrderConfirmed { order_id })?;
        self.bus.publish(TOPIC_ORDERS, &confirmed).await?;

        order.status = OrderStatus::Confirmed;
        info!(order_id = %order_id, "Confirmed order");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use boxoffice_bus::MemoryBus;
    use boxoffice_core::error::ErrorKind;
    use boxoffice_store::MemoryStore;

    use super::*;
    use crate::testutil::{repos, seat};

    #[tokio::test]
    async fn confirm_marks_seats_sold_and_disarms_expiry() {
        let s1 = seat(7, "A-1", 50.0);
        let (orders, seats) = repos(vec![s1.clone()]);
        let store = Arc::new(MemoryStore::new());
        let bus = Arc::new(MemoryBus::new());

        let order = Order::pending(Uuid::new_v4(), 7, vec![s1.id], 50.0);
        orders.put(order.clone()).await;
        store
            .set_marker(
                &keys::order_expiry(order.id),
                std::time::Duration::from_secs(300),
            )
            .await
            .unwrap();

        let service = ConfirmationService::new(store.clone(), bus.clone(), orders.clone(), seats.clone());
        let confirmed = service.confirm(order.id).await.unwrap();

        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(seats.status_of(s1.id).await, Some(SeatStatus::Sold));
        assert!(!store.has_marker(&keys::order_expiry(order.id)));
        assert_eq!(bus.published(TOPIC_ORDERS).await.len(), 1);
    }

    #[tokio::test]
    async fn second_confirmation_conflicts() {
        let s1 = seat(7, "A-1", 50.0);
        let (orders, seats) = repos(vec![s1.clone()]);
        let store = Arc::new(MemoryStore::new());
        let bus = Arc::new(MemoryBus::new());

        let order = Order::pending(Uuid::new_v4(), 7, vec![s1.id], 50.0);
        orders.put(order.clone()).await;

        let service = ConfirmationService::new(store, bus, orders, seats);
        service.confirm(order.id).await.unwrap();

        let err = service.confirm(order.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn cancelled_order_cannot_be_confirmed() {
        let s1 = seat(7, "A-1", 50.0);
        let (orders, seats) = repos(vec![s1.clone()]);

        let mut order = Order::pending(Uuid::new_v4(), 7, vec![s1.id], 50.0);
        order.status = OrderStatus::Cancelled;
        orders.put(order.clone()).await;

        let service = ConfirmationService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryBus::new()),
            orders,
            seats.clone(),
        );

        let err = service.confirm(order.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(seats.status_of(s1.id).await, Some(SeatStatus::Available));
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let (orders, seats) = repos(vec![]);
        let service = ConfirmationService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryBus::new()),
            orders,
            seats,
        );

        let err = service.confirm(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
