//! Event bus backends.
//!
//! Cross-service domain events (reservations, cancellations, lifecycle
//! changes) travel over an [`boxoffice_core::traits::EventBus`]. The
//! production backend rides Redis pub/sub; the in-memory backend serves
//! single-process tests.

pub mod memory;
pub mod redis;

pub use memory::MemoryBus;
pub use redis::RedisEventBus;
