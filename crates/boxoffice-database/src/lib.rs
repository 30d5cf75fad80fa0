//! PostgreSQL persistence for orders and seats.

pub mod connection;
pub mod migration;
pub mod repositories;
