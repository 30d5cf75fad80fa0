//! Request DTOs.

use serde::Deserialize;
use uuid::Uuid;

/// POST /api/bookings body.
#[derive(Debug, Clone, Deserialize)]
pub struct ReserveRequest {
    /// The purchaser.
    #[serde(rename = "userId", alias = "user_id")]
    pub user_id: Uuid,
    /// The event to book seats for.
    #[serde(rename = "eventId", alias = "event_id")]
    pub event_id: i64,
    /// The seats to hold.
    #[serde(rename = "seatIds", alias = "seat_ids")]
    pub seat_ids: Vec<Uuid>,
}

/// POST /api/v1/auth/queue-token body.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueTokenRequest {
    /// The user requesting admission.
    #[serde(rename = "userId", alias = "user_id")]
    pub user_id: String,
    /// The event the admission is scoped to.
    #[serde(rename = "eventId", alias = "event_id")]
    pub event_id: i64,
}

/// Query parameters identifying a queue entry (waiting-room page and
/// position WebSocket).
#[derive(Debug, Clone, Deserialize)]
pub struct QueueEntryQuery {
    /// The queued user.
    #[serde(rename = "userId", alias = "user_id")]
    pub user_id: String,
    /// The event being queued for.
    #[serde(rename = "eventId", alias = "event_id")]
    pub event_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_request_accepts_both_casings() {
        let camel = r#"{"userId":"00000000-0000-0000-0000-000000000001","eventId":7,"seatIds":[]}"#;
        let snake = r#"{"user_id":"00000000-0000-0000-0000-000000000001","event_id":7,"seat_ids":[]}"#;

        let a: ReserveRequest = serde_json::from_str(camel).unwrap();
        let b: ReserveRequest = serde_json::from_str(snake).unwrap();
        assert_eq!(a.event_id, b.event_id);
        assert_eq!(a.user_id, b.user_id);
    }
}
