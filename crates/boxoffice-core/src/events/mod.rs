//! Canonical event-bus message schemas.
//!
//! Every lifecycle change that other subsystems care about is announced
//! on the bus as one of these JSON shapes. Legacy field-name aliases from
//! older producers are accepted at this deserialization boundary only;
//! everything Boxoffice emits uses the canonical camelCase names.

pub mod lifecycle;
pub mod order;
pub mod ticket;

pub use lifecycle::{EventLifecycle, LifecycleKind};
pub use order::{OrderConfirmed, OrderCreated};
pub use ticket::{TicketCancelled, TicketReserved};

/// Topic carrying event lifecycle announcements (created/published/cancelled).
pub const TOPIC_LIFECYCLE: &str = "events.lifecycle";

/// Topic carrying order creation and confirmation announcements.
pub const TOPIC_ORDERS: &str = "orders.topic";

/// Topic announcing that seats were reserved for an order.
pub const TOPIC_TICKET_RESERVED: &str = "ticket-reserved";

/// Topic announcing that a reservation was cancelled and its seats freed.
pub const TOPIC_TICKET_CANCELLED: &str = "ticket-cancelled";
