//! HTTP and WebSocket surface.
//!
//! Mounts the booking endpoints behind the admission gate, the queue-token
//! and waiting-room endpoints in front of it, and the position-streaming
//! WebSocket.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
