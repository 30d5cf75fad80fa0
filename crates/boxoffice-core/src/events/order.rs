//! Order lifecycle announcements on `orders.topic`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emitted once a PENDING order has been durably created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    /// The new order's identifier.
    #[serde(rename = "orderId", alias = "order_id")]
    pub order_id: Uuid,
    /// The purchaser.
    #[serde(rename = "userId", alias = "user_id")]
    pub user_id: Uuid,
    /// Computed total for the reserved seats.
    #[serde(rename = "totalAmount", alias = "total_amount")]
    pub total_amount: f64,
}

/// Emitted when a PENDING order transitions to CONFIRMED.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmed {
    /// The confirmed order's identifier.
    #[serde(rename = "orderId", alias = "order_id")]
    pub order_id: Uuid,
}
