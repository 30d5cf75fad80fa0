//! Event lifecycle announcements consumed to manage availability counters.

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a ticketed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LifecycleKind {
    /// The event exists but is not yet on sale.
    Created,
    /// The event went on sale; its availability counter becomes live.
    Published,
    /// The event was cancelled; counters and queues are torn down.
    Cancelled,
}

/// An `events.lifecycle` message.
///
/// Older producers used several spellings for the same fields; the
/// `alias` attributes absorb them here so the rest of the system only
/// ever sees the canonical shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLifecycle {
    /// What happened to the event.
    #[serde(rename = "type", alias = "kind")]
    pub kind: LifecycleKind,
    /// The event identifier.
    #[serde(rename = "eventId", alias = "event_id", alias = "id")]
    pub event_id: i64,
    /// Human-readable event name.
    pub name: String,
    /// Total sellable inventory at publication time.
    #[serde(
        rename = "totalInventory",
        alias = "total_inventory",
        alias = "capacity"
    )]
    pub total_inventory: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_shape() {
        let raw = r#"{"type":"PUBLISHED","eventId":7,"name":"Opening Night","totalInventory":120}"#;
        let msg: EventLifecycle = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.kind, LifecycleKind::Published);
        assert_eq!(msg.event_id, 7);
        assert_eq!(msg.total_inventory, 120);
    }

    #[test]
    fn accepts_legacy_aliases() {
        let raw = r#"{"type":"CANCELLED","event_id":7,"name":"Opening Night","capacity":120}"#;
        let msg: EventLifecycle = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.kind, LifecycleKind::Cancelled);
        assert_eq!(msg.event_id, 7);
        assert_eq!(msg.total_inventory, 120);
    }
}
