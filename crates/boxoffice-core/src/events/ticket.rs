//! Seat-level reservation announcements.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emitted when seats were durably marked reserved for an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketReserved {
    /// The owning order.
    #[serde(rename = "orderId", alias = "order_id")]
    pub order_id: Uuid,
    /// The event the seats belong to.
    #[serde(rename = "eventId", alias = "event_id")]
    pub event_id: i64,
    /// The reserved seats.
    #[serde(rename = "seatIds", alias = "seat_ids")]
    pub seat_ids: Vec<Uuid>,
    /// The purchaser.
    #[serde(rename = "userId", alias = "user_id")]
    pub user_id: Uuid,
}

/// Emitted when a reservation was cancelled and its seats released.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketCancelled {
    /// The cancelled order.
    #[serde(rename = "orderId", alias = "order_id")]
    pub order_id: Uuid,
    /// The event the seats belong to.
    #[serde(rename = "eventId", alias = "event_id")]
    pub event_id: i64,
    /// The released seats.
    #[serde(rename = "seatIds", alias = "seat_ids")]
    pub seat_ids: Vec<Uuid>,
    /// Why the reservation was cancelled (e.g. `PAYMENT_TIMEOUT`).
    pub reason: String,
}

/// Cancellation reason recorded when a reservation's expiry marker fires.
pub const REASON_PAYMENT_TIMEOUT: &str = "PAYMENT_TIMEOUT";
