//! Core types shared by every Boxoffice crate.
//!
//! Contains the unified error type, configuration schemas, the canonical
//! event-bus message schemas, and the traits that decouple the booking
//! and queue subsystems from their Redis/Postgres backends.

pub mod config;
pub mod error;
pub mod events;
pub mod keys;
pub mod result;
pub mod traits;
