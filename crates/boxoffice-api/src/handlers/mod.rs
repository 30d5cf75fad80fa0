//! HTTP and WebSocket handlers.

pub mod booking;
pub mod health;
pub mod queue;
pub mod ws;
