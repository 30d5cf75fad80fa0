//! sqlx repository implementations.

pub mod order;
pub mod seat;
