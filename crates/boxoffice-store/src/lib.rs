//! Coordination-store backends.
//!
//! [`redis::RedisStore`] is the production backend; [`memory::MemoryStore`]
//! is a single-process twin with deterministic expiry control, used by the
//! test suites.

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;
