//! The reservation-expiry compensator.
//!
//! Listens for expiry-marker notifications and cancels reservations whose
//! payment never arrived, returning their seats and tickets to the pool.
//! The conditional cancellation and the seat restore run as one durable
//! transaction. Notifications are at-least-once and may also arrive for
//! orders that were confirmed in the meantime; the conditional
//! PENDING→CANCELLED transition makes reprocessing harmless.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use boxoffice_core::events::TOPIC_TICKET_CANCELLED;
use boxoffice_core::events::ticket::{REASON_PAYMENT_TIMEOUT, TicketCancelled};
use boxoffice_core::keys;
use boxoffice_core::result::AppResult;
use boxoffice_core::traits::{CoordinationStore, EventBus};
use boxoffice_entity::repository::OrderRepository;

/// Cancels reservations whose expiry marker fired.
#[derive(Debug, Clone)]
pub struct ExpiryCompensator {
    /// Coordination store delivering expiry notifications.
    store: Arc<dyn CoordinationStore>,
    /// Event bus for cancellation announcements.
    bus: Arc<dyn EventBus>,
    /// Durable orders.
    orders: Arc<dyn OrderRepository>,
}

impl ExpiryCompensator {
    /// Creates a new compensator.
    pub fn new(
        store: Arc<dyn CoordinationStore>,
        bus: Arc<dyn EventBus>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        Self { store, bus, orders }
    }

    /// Run until the cancel signal is received.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) -> AppResult<()> {
        let mut expirations = self.store.subscribe_expired().await?;
        info!("Expiry compensator started");

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!("Expiry compensator received shutdown signal");
                        break;
                    }
                }
                next = expirations.recv() => {
                    match next {
                        Some(key) => {
                            if let Err(e) = self.handle_expired_key(&key).await {
                                error!(key, error = %e, "Failed to compensate expired reservation");
                            }
                        }
                        None => {
                            error!("Expiry notification stream ended");
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Process one expired key. Non-reservation keys are ignored.
    pub async fn handle_expired_key(&self, key: &str) -> AppResult<()> {
        let Some(order_id) = keys::parse_order_expiry(key) else {
            return Ok(());
        };

        let Some(order) = self.orders.find_by_id(order_id).await? else {
            warn!(order_id = %order_id, "Expiry fired for unknown order");
            return Ok(());
        };

        let cancelled = self.orders.cancel_pending(order_id, &order.seat_ids).await?;
        if !cancelled {
            debug!(order_id = %order_id, "Order already resolved, nothing to compensate");
            return Ok(());
        }

        self.store
            .increment(
                &keys::tickets_available(order.event_id),
                order.seat_ids.len() as i64,
            )
            .await?;

        let announcement = serde_json::to_string(&TicketCancelled {
            order_id,
            event_id: order.event_id,
            seat_ids: order.seat_ids.clone(),
            reason: REASON_PAYMENT_TIMEOUT.to_string(),
        })?;
        self.bus
            .publish(TOPIC_TICKET_CANCELLED, &announcement)
            .await?;

        info!(
            order_id = %order_id,
            event_id = order.event_id,
            seats = order.seat_ids.len(),
            "Cancelled expired reservation"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use boxoffice_bus::MemoryBus;
    use boxoffice_store::MemoryStore;
    use uuid::Uuid;

    use boxoffice_entity::order::{Order, OrderStatus};
    use boxoffice_entity::seat::SeatStatus;

    use super::*;
    use crate::testutil::{repos, seat};

    struct Fixture {
        store: Arc<MemoryStore>,
        bus: Arc<MemoryBus>,
        orders: Arc<crate::testutil::InMemoryOrders>,
        seats: Arc<crate::testutil::InMemorySeats>,
        compensator: ExpiryCompensator,
    }

    fn fixture(seats: Vec<boxoffice_entity::seat::Seat>) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let bus = Arc::new(MemoryBus::new());
        let (orders, seat_repo) = repos(seats);
        let compensator = ExpiryCompensator::new(store.clone(), bus.clone(), orders.clone());
        Fixture {
            store,
            bus,
            orders,
            seats: seat_repo,
            compensator,
        }
    }

    #[tokio::test]
    async fn expired_pending_order_is_cancelled_and_compensated() {
        let mut s1 = seat(7, "A-1", 50.0);
        s1.status = SeatStatus::Reserved;
        let fx = fixture(vec![s1.clone()]);
        fx.store
            .counter_set(&keys::tickets_available(7), 0)
            .await
            .unwrap();

        let order = Order::pending(Uuid::new_v4(), 7, vec![s1.id], 50.0);
        fx.orders.put(order.clone()).await;

        fx.compensator
            .handle_expired_key(&keys::order_expiry(order.id))
            .await
            .unwrap();

        let cancelled = fx.orders.get(order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(fx.seats.status_of(s1.id).await, Some(SeatStatus::Available));
        assert_eq!(
            fx.store
                .counter_get(&keys::tickets_available(7))
                .await
                .unwrap(),
            Some(1)
        );

        let announced = fx.bus.published(TOPIC_TICKET_CANCELLED).await;
        assert_eq!(announced.len(), 1);
        let event: TicketCancelled = serde_json::from_str(&announced[0]).unwrap();
        assert_eq!(event.reason, REASON_PAYMENT_TIMEOUT);
    }

    #[tokio::test]
    async fn confirmed_order_is_left_alone() {
        let mut s1 = seat(7, "A-1", 50.0);
        s1.status = SeatStatus::Sold;
        let fx = fixture(vec![s1.clone()]);
        fx.store
            .counter_set(&keys::tickets_available(7), 0)
            .await
            .unwrap();

        let mut order = Order::pending(Uuid::new_v4(), 7, vec![s1.id], 50.0);
        order.status = OrderStatus::Confirmed;
        fx.orders.put(order.clone()).await;

        fx.compensator
            .handle_expired_key(&keys::order_expiry(order.id))
            .await
            .unwrap();

        assert_eq!(fx.seats.status_of(s1.id).await, Some(SeatStatus::Sold));
        assert_eq!(
            fx.store
                .counter_get(&keys::tickets_available(7))
                .await
                .unwrap(),
            Some(0)
        );
        assert!(fx.bus.published(TOPIC_TICKET_CANCELLED).await.is_empty());
    }

    #[tokio::test]
    async fn reprocessing_the_same_expiry_is_idempotent() {
        let mut s1 = seat(7, "A-1", 50.0);
        s1.status = SeatStatus::Reserved;
        let fx = fixture(vec![s1.clone()]);
        fx.store
            .counter_set(&keys::tickets_available(7), 0)
            .await
            .unwrap();

        let order = Order::pending(Uuid::new_v4(), 7, vec![s1.id], 50.0);
        fx.orders.put(order.clone()).await;

        let key = keys::order_expiry(order.id);
        fx.compensator.handle_expired_key(&key).await.unwrap();
        fx.compensator.handle_expired_key(&key).await.unwrap();

        // Compensated exactly once.
        assert_eq!(
            fx.store
                .counter_get(&keys::tickets_available(7))
                .await
                .unwrap(),
            Some(1)
        );
        assert_eq!(fx.bus.published(TOPIC_TICKET_CANCELLED).await.len(), 1);
    }

    #[tokio::test]
    async fn foreign_keys_and_unknown_orders_are_ignored() {
        let fx = fixture(vec![]);

        fx.compensator
            .handle_expired_key("session:whatever")
            .await
            .unwrap();
        fx.compensator
            .handle_expired_key(&keys::order_expiry(Uuid::new_v4()))
            .await
            .unwrap();

        assert!(fx.bus.published(TOPIC_TICKET_CANCELLED).await.is_empty());
    }

    #[tokio::test]
    async fn run_consumes_forced_expirations() {
        let mut s1 = seat(7, "A-1", 50.0);
        s1.status = SeatStatus::Reserved;
        let fx = fixture(vec![s1.clone()]);
        fx.store
            .counter_set(&keys::tickets_available(7), 0)
            .await
            .unwrap();

        let order = Order::pending(Uuid::new_v4(), 7, vec![s1.id], 50.0);
        fx.orders.put(order.clone()).await;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let compensator = fx.compensator.clone();
        let handle = tokio::spawn(async move { compensator.run(cancel_rx).await });

        // Give the run loop a moment to subscribe before firing.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        fx.store.force_expire(&keys::order_expiry(order.id)).await;
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        cancel_tx.send(true).unwrap();
        handle.await.unwrap().unwrap();

        let cancelled = fx.orders.get(order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }
}
