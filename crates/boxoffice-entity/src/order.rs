//! Order model: a reservation and its lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an order.
///
/// An order is born PENDING and reaches exactly one terminal state:
/// CONFIRMED through the confirmation path, or CANCELLED through the
/// expiry compensator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "order_status", rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Seats are held, awaiting payment confirmation.
    Pending,
    /// Payment confirmed; seats are sold.
    Confirmed,
    /// Abandoned or rejected; seats were released.
    Cancelled,
}

/// A reservation of one or more seats for an event.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    /// Order identifier; also keys the expiry marker in the store.
    pub id: Uuid,
    /// The purchaser.
    pub user_id: Uuid,
    /// The event the seats belong to.
    pub event_id: i64,
    /// The held seats.
    pub seat_ids: Vec<Uuid>,
    /// Computed total for the held seats.
    pub total_amount: f64,
    /// Current lifecycle status.
    pub status: OrderStatus,
    /// When the reservation was created.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new PENDING order.
    pub fn pending(user_id: Uuid, event_id: i64, seat_ids: Vec<Uuid>, total_amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            event_id,
            seat_ids,
            total_amount,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
