//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use boxoffice_entity::order::Order;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Order summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    /// Order ID.
    pub id: Uuid,
    /// The purchaser.
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    /// The event.
    #[serde(rename = "eventId")]
    pub event_id: i64,
    /// The held seats.
    #[serde(rename = "seatIds")]
    pub seat_ids: Vec<Uuid>,
    /// Computed total.
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
    /// Lifecycle status.
    pub status: String,
    /// Creation time.
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            event_id: order.event_id,
            seat_ids: order.seat_ids,
            total_amount: order.total_amount,
            status: format!("{:?}", order.status).to_uppercase(),
            created_at: order.created_at,
        }
    }
}

/// Admission token response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueTokenResponse {
    /// Signed admission token.
    pub token: String,
}

/// Waiting-room status snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStatusResponse {
    /// `"WAITING"` or `"PROMOTED"`.
    pub status: String,
    /// 1-based queue position while waiting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Database reachability.
    pub database: String,
    /// Coordination-store reachability.
    pub store: String,
}
