//! In-memory repository and bus fakes for the booking tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

use boxoffice_core::error::AppError;
use boxoffice_core::result::AppResult;
use boxoffice_core::traits::EventBus;
use boxoffice_entity::order::{Order, OrderStatus};
use boxoffice_entity::repository::{OrderRepository, SeatRepository};
use boxoffice_entity::seat::{Seat, SeatStatus};

/// Build a test seat for an event.
pub fn seat(event_id: i64, label: &str, price: f64) -> Seat {
    Seat {
        id: Uuid::new_v4(),
        event_id,
        label: label.to_string(),
        price,
        status: SeatStatus::Available,
    }
}

/// In-memory [`OrderRepository`], linked to the seat fake so the combined
/// cancel-and-restore operation mirrors the durable transaction.
#[derive(Debug)]
pub struct InMemoryOrders {
    orders: Mutex<HashMap<Uuid, Order>>,
    seats: Arc<InMemorySeats>,
}

impl InMemoryOrders {
    pub fn linked(seats: Arc<InMemorySeats>) -> Self {
        Self {
            orders: Mutex::new(HashMap::new()),
            seats,
        }
    }

    /// Fetch an order directly, bypassing the trait.
    pub async fn get(&self, id: Uuid) -> Option<Order> {
        self.orders.lock().await.get(&id).cloned()
    }

    /// Insert an order directly, bypassing the trait.
    pub async fn put(&self, order: Order) {
        self.orders.lock().await.insert(order.id, order);
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn insert(&self, order: &Order) -> AppResult<()> {
        let mut orders = self.orders.lock().await;
        if orders.contains_key(&order.id) {
            return Err(AppError::conflict("Duplicate order id"));
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        Ok(self.orders.lock().await.get(&id).cloned())
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> AppResult<bool> {
        let mut orders = self.orders.lock().await;
        match orders.get_mut(&id) {
            Some(order) if order.status == from => {
                order.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn cancel_pending(&self, id: Uuid, seat_ids: &[Uuid]) -> AppResult<bool> {
        let mut orders = self.orders.lock().await;
        match orders.get_mut(&id) {
            Some(order) if order.status == OrderStatus::Pending => {
                order.status = OrderStatus::Cancelled;
            }
            _ => return Ok(false),
        }
        drop(orders);
        self.seats
            .update_status(seat_ids, SeatStatus::Available)
            .await?;
        Ok(true)
    }
}

/// In-memory [`SeatRepository`] with switchable update faults.
#[derive(Debug, Default)]
pub struct InMemorySeats {
    seats: Mutex<HashMap<Uuid, Seat>>,
    fail_updates: AtomicBool,
}

impl InMemorySeats {
    pub fn new(seats: Vec<Seat>) -> Self {
        Self {
            seats: Mutex::new(seats.into_iter().map(|s| (s.id, s)).collect()),
            fail_updates: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `update_status` fail (or succeed again).
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Current status of a seat, bypassing the trait.
    pub async fn status_of(&self, id: Uuid) -> Option<SeatStatus> {
        self.seats.lock().await.get(&id).map(|s| s.status)
    }
}

#[async_trait]
impl SeatRepository for InMemorySeats {
    async fn find_by_ids(&self, event_id: i64, seat_ids: &[Uuid]) -> AppResult<Vec<Seat>> {
        let seats = self.seats.lock().await;
        Ok(seat_ids
            .iter()
            .filter_map(|id| seats.get(id))
            .filter(|s| s.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn count_available(&self, event_id: i64) -> AppResult<i64> {
        let seats = self.seats.lock().await;
        Ok(seats
            .values()
            .filter(|s| s.event_id == event_id && s.status == SeatStatus::Available)
            .count() as i64)
    }

    async fn update_status(&self, seat_ids: &[Uuid], status: SeatStatus) -> AppResult<u64> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::database("Seat update failed"));
        }
        let mut seats = self.seats.lock().await;
        let mut updated = 0;
        for id in seat_ids {
            if let Some(seat) = seats.get_mut(id) {
                seat.status = status;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

/// Event bus whose publishes always fail.
#[derive(Debug, Default)]
pub struct FailingBus;

#[async_trait]
impl EventBus for FailingBus {
    async fn publish(&self, topic: &str, _payload: &str) -> AppResult<()> {
        Err(AppError::bus(format!("Publish to '{topic}' failed")))
    }

    async fn subscribe(&self, _topic: &str) -> AppResult<mpsc::Receiver<String>> {
        let (_tx, rx) = mpsc::channel(1);
        Ok(rx)
    }
}

/// Arc-wrapped fakes preassembled for the common case.
pub fn repos(seats: Vec<Seat>) -> (Arc<InMemoryOrders>, Arc<InMemorySeats>) {
    let seat_repo = Arc::new(InMemorySeats::new(seats));
    (
        Arc::new(InMemoryOrders::linked(seat_repo.clone())),
        seat_repo,
    )
}
