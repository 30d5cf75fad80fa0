//! Seat model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sale status of a single seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "seat_status", rename_all = "UPPERCASE")]
pub enum SeatStatus {
    /// Free to reserve.
    Available,
    /// Held by a PENDING order.
    Reserved,
    /// Sold through a CONFIRMED order.
    Sold,
}

/// One sellable seat of an event.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Seat {
    /// Seat identifier.
    pub id: Uuid,
    /// Owning event.
    pub event_id: i64,
    /// Display label (e.g. "A-14").
    pub label: String,
    /// Price of this seat.
    pub price: f64,
    /// Current sale status.
    pub status: SeatStatus,
}
