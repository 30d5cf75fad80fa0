//! Waiting-room admission control.
//!
//! Arrivals queue up in a per-event score-ordered set (score = arrival
//! time). A scheduled promoter moves the head of each queue into the
//! event's active set at a bounded rate; active users can mint admission
//! tokens and reach the booking endpoints.

pub mod messages;
pub mod promoter;
pub mod waiting_room;

pub use messages::{ErrorMessage, PositionMessage, PromotedMessage};
pub use promoter::{PromotionScheduler, QueuePromoter};
pub use waiting_room::{QueueStatus, WaitingRoom};
