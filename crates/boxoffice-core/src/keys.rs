//! Coordination-store key builders.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses. These are the logical keys;
//! the store applies any configured deployment prefix on top.

use uuid::Uuid;

/// Prefix of reservation-expiry marker keys.
const ORDER_EXPIRY_PREFIX: &str = "order_expiry:";

/// Prefix of per-event waiting queues.
const QUEUE_WAITING_PREFIX: &str = "queue:waiting:";

/// Counter of seats not yet held for an event.
pub fn tickets_available(event_id: i64) -> String {
    format!("tickets:available:{event_id}")
}

/// Exclusive lease key for one seat of one event.
pub fn seat_lock(event_id: i64, seat_id: Uuid) -> String {
    format!("seat:lock:{event_id}:{seat_id}")
}

/// TTL marker whose expiry triggers reservation compensation.
pub fn order_expiry(order_id: Uuid) -> String {
    format!("{ORDER_EXPIRY_PREFIX}{order_id}")
}

/// Score-ordered waiting set for an event (score = arrival millis).
pub fn queue_waiting(event_id: i64) -> String {
    format!("{QUEUE_WAITING_PREFIX}{event_id}")
}

/// Pattern matching every event's waiting set.
pub fn queue_waiting_pattern() -> String {
    format!("{QUEUE_WAITING_PREFIX}*")
}

/// Membership set of users admitted past the waiting room for an event.
pub fn queue_active(event_id: i64) -> String {
    format!("queue:active:{event_id}")
}

/// Extract the event identifier out of a waiting-set key.
pub fn parse_queue_waiting(key: &str) -> Option<i64> {
    key.strip_prefix(QUEUE_WAITING_PREFIX)?.parse().ok()
}

/// Extract the order identifier out of an expiry-marker key.
///
/// Returns `None` for foreign keys so expiry notifications for unrelated
/// entries are ignored.
pub fn parse_order_expiry(key: &str) -> Option<Uuid> {
    let raw = key.strip_prefix(ORDER_EXPIRY_PREFIX)?;
    Uuid::parse_str(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_key() {
        assert_eq!(tickets_available(42), "tickets:available:42");
    }

    #[test]
    fn test_seat_lock_key() {
        let id = Uuid::nil();
        assert_eq!(
            seat_lock(42, id),
            "seat:lock:42:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_order_expiry_roundtrip() {
        let id = Uuid::new_v4();
        assert_eq!(parse_order_expiry(&order_expiry(id)), Some(id));
    }

    #[test]
    fn test_order_expiry_rejects_foreign_keys() {
        assert_eq!(parse_order_expiry("session:abc"), None);
        assert_eq!(parse_order_expiry("order_expiry:not-a-uuid"), None);
    }

    #[test]
    fn test_queue_waiting_roundtrip() {
        assert_eq!(parse_queue_waiting(&queue_waiting(7)), Some(7));
        assert_eq!(parse_queue_waiting("queue:active:7"), None);
    }
}
