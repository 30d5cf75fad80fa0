//! Redis-backed coordination store.

pub mod client;
pub mod expiry;
pub mod store;

pub use client::RedisClient;
pub use store::RedisStore;
