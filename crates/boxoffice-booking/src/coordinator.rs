//! The seat reservation saga.
//!
//! Ordering of the steps is what makes overselling impossible:
//!
//! 1. atomic check-and-decrement of the availability counter (the single
//!    linearization point for concurrent attempts against one event),
//! 2. all-or-nothing leases on the requested seats,
//! 3. validate and persist the PENDING order under the leases,
//! 4. arm the expiry marker, mark the seats, announce the reservation,
//! 5. release the leases.
//!
//! Arming the marker is the saga's commit point. Failures between the
//! decrement and the marker restore the counter before the error is
//! returned; failures after it leave the durable state and counter
//! untouched, because the armed marker guarantees the expiry compensator
//! performs the single canonical cleanup. Either way a failed attempt
//! never leaks inventory in either direction.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use boxoffice_core::config::booking::BookingConfig;
use boxoffice_core::error::AppError;
use boxoffice_core::events::order::OrderCreated;
use boxoffice_core::events::ticket::TicketReserved;
use boxoffice_core::events::{TOPIC_ORDERS, TOPIC_TICKET_RESERVED};
use boxoffice_core::keys;
use boxoffice_core::result::AppResult;
use boxoffice_core::traits::{CoordinationStore, EventBus};
use boxoffice_entity::order::{Order, OrderStatus};
use boxoffice_entity::repository::{OrderRepository, SeatRepository};
use boxoffice_entity::seat::SeatStatus;

/// Status reported for a freshly created reservation.
pub const STATUS_RESERVED: &str = "RESERVED_AWAITING_CONFIRMATION";

/// Outcome of a successful reservation.
#[derive(Debug, Clone, Serialize)]
pub struct Reservation {
    /// The created PENDING order.
    #[serde(rename = "orderId")]
    pub order_id: Uuid,
    /// Always [`STATUS_RESERVED`].
    pub status: &'static str,
}

/// Failure inside the critical section, tagged with whether the expiry
/// marker was already armed. Once armed, cleanup belongs to the expiry
/// compensator; restoring the counter here as well would credit the same
/// seats twice.
struct SagaFailure {
    error: AppError,
    marker_armed: bool,
}

impl SagaFailure {
    fn rollback(error: AppError) -> Self {
        Self {
            error,
            marker_armed: false,
        }
    }

    fn committed(error: AppError) -> Self {
        Self {
            error,
            marker_armed: true,
        }
    }
}

/// Drives the seat reservation saga.
#[derive(Debug, Clone)]
pub struct ReservationCoordinator {
    /// Coordination store for counters, leases, and expiry markers.
    store: Arc<dyn CoordinationStore>,
    /// Event bus for reservation announcements.
    bus: Arc<dyn EventBus>,
    /// Durable orders.
    orders: Arc<dyn OrderRepository>,
    /// Durable seats.
    seats: Arc<dyn SeatRepository>,
    /// Saga timing configuration.
    config: BookingConfig,
}

impl ReservationCoordinator {
    /// Creates a new coordinator.
    pub fn new(
        store: Arc<dyn CoordinationStore>,
        bus: Arc<dyn EventBus>,
        orders: Arc<dyn OrderRepository>,
        seats: Arc<dyn SeatRepository>,
        config: BookingConfig,
    ) -> Self {
        Self {
            store,
            bus,
            orders,
            seats,
            config,
        }
    }

    /// Reserve the given seats for a user, creating a PENDING order.
    pub async fn reserve(
        &self,
        user_id: Uuid,
        event_id: i64,
        seat_ids: &[Uuid],
    ) -> AppResult<Reservation> {
        if seat_ids.is_empty() {
            return Err(AppError::validation("At least one seat must be requested"));
        }
        let unique: HashSet<Uuid> = seat_ids.iter().copied().collect();
        if unique.len() != seat_ids.len() {
            return Err(AppError::validation("Duplicate seats in request"));
        }

        let requested = seat_ids.len() as i64;
        let counter_key = keys::tickets_available(event_id);

        self.ensure_counter(event_id, &counter_key).await?;

        if !self.store.try_decrement(&counter_key, requested).await? {
            return Err(AppError::insufficient_inventory(format!(
                "Not enough tickets remain for event {event_id}"
            )));
        }

        // From here on, every exit path must either complete the order or
        // hand the decremented amount to exactly one compensating path.
        let mut lease_keys: Vec<String> = seat_ids
            .iter()
            .map(|seat_id| keys::seat_lock(event_id, *seat_id))
            .collect();
        lease_keys.sort();

        let token = match self
            .store
            .acquire_leases(
                &lease_keys,
                Duration::from_millis(self.config.lock_wait_ms),
                Duration::from_millis(self.config.lock_lease_ms),
            )
            .await
        {
            Ok(Some(token)) => token,
            Ok(None) => {
                self.restore_counter(&counter_key, requested).await;
                return Err(AppError::lock_contention(format!(
                    "Could not lock all requested seats for event {event_id}"
                )));
            }
            Err(e) => {
                self.restore_counter(&counter_key, requested).await;
                return Err(e);
            }
        };

        let outcome = self.reserve_under_lease(user_id, event_id, seat_ids).await;

        if let Err(e) = self.store.release_leases(&lease_keys, &token).await {
            warn!(event_id, error = %e, "Failed to release seat leases");
        }

        match outcome {
            Ok(order_id) => Ok(Reservation {
                order_id,
                status: STATUS_RESERVED,
            }),
            Err(failure) => {
                if failure.marker_armed {
                    warn!(
                        event_id,
                        error = %failure.error,
                        "Reservation failed after its expiry marker was armed; the compensator will clean up"
                    );
                } else {
                    self.restore_counter(&counter_key, requested).await;
                }
                Err(failure.error)
            }
        }
    }

    /// Warm the availability counter from the durable seat table if no
    /// authoritative announcement has initialized it yet.
    async fn ensure_counter(&self, event_id: i64, counter_key: &str) -> AppResult<()> {
        if self.store.counter_get(counter_key).await?.is_some() {
            return Ok(());
        }
        let available = self.seats.count_available(event_id).await?;
        if self.store.counter_init(counter_key, available).await? {
            info!(event_id, available, "Warmed availability counter");
        }
        Ok(())
    }

    /// The critical section: validate and persist while holding every
    /// seat lease.
    ///
    /// The marker is armed directly after the order insert so that no
    /// PENDING order can outlive a fault without a marker pointing at it.
    /// A successful `set_marker` is the commit point; everything after it
    /// fails as [`SagaFailure::committed`].
    async fn reserve_under_lease(
        &self,
        user_id: Uuid,
        event_id: i64,
        seat_ids: &[Uuid],
    ) -> Result<Uuid, SagaFailure> {
        let order = self
            .create_pending_order(user_id, event_id, seat_ids)
            .await
            .map_err(SagaFailure::rollback)?;

        if let Err(e) = self
            .store
            .set_marker(
                &keys::order_expiry(order.id),
                Duration::from_secs(self.config.reservation_ttl_seconds),
            )
            .await
        {
            // Nothing will ever compensate an unmarked order; take it
            // back out of PENDING before unwinding.
            self.abandon_order(order.id).await;
            return Err(SagaFailure::rollback(e));
        }

        self.finish_reservation(&order)
            .await
            .map_err(SagaFailure::committed)?;
        Ok(order.id)
    }

    /// Validate the requested seats and durably create the PENDING order.
    async fn create_pending_order(
        &self,
        user_id: Uuid,
        event_id: i64,
        seat_ids: &[Uuid],
    ) -> AppResult<Order> {
        let seats = self.seats.find_by_ids(event_id, seat_ids).await?;
        if seats.len() != seat_ids.len() {
            return Err(AppError::not_found(format!(
                "One or more requested seats do not exist for event {event_id}"
            )));
        }
        if let Some(taken) = seats.iter().find(|s| s.status != SeatStatus::Available) {
            return Err(AppError::seat_conflict(format!(
                "Seat '{}' is no longer available",
                taken.label
            )));
        }

        let total_amount: f64 = seats.iter().map(|s| s.price).sum();
        let order = Order::pending(user_id, event_id, seat_ids.to_vec(), total_amount);
        self.orders.insert(&order).await?;
        Ok(order)
    }

    /// Mark the seats reserved and announce the order. Runs after the
    /// commit point.
    async fn finish_reservation(&self, order: &Order) -> AppResult<()> {
        self.seats
            .update_status(&order.seat_ids, SeatStatus::Reserved)
            .await?;

        let created = serde_json::to_string(&OrderCreated {
            order_id: order.id,
            user_id: order.user_id,
            total_amount: order.total_amount,
        })?;
        self.bus.publish(TOPIC_ORDERS, &created).await?;

        let reserved = serde_json::to_string(&TicketReserved {
            order_id: order.id,
            event_id: order.event_id,
            seat_ids: order.seat_ids.clone(),
            user_id: order.user_id,
        })?;
        self.bus.publish(TOPIC_TICKET_RESERVED, &reserved).await?;

        info!(
            order_id = %order.id,
            event_id = order.event_id,
            seats = order.seat_ids.len(),
            "Created PENDING reservation"
        );
        Ok(())
    }

    /// Best-effort cancellation of an order whose marker could not be armed.
    async fn abandon_order(&self, order_id: Uuid) {
        match self
            .orders
            .transition_status(order_id, OrderStatus::Pending, OrderStatus::Cancelled)
            .await
        {
            Ok(true) => {}
            Ok(false) => warn!(order_id = %order_id, "Unmarked order was already resolved"),
            Err(e) => warn!(order_id = %order_id, error = %e, "Failed to cancel unmarked order"),
        }
    }

    /// Give a failed attempt's tickets back to the pool.
    async fn restore_counter(&self, counter_key: &str, amount: i64) {
        if let Err(e) = self.store.increment(counter_key, amount).await {
            // The compensator cannot fix this; the counter now undercounts
            // until the next authoritative announcement.
            warn!(counter_key, amount, error = %e, "Failed to restore availability counter");
        }
    }
}
