//! Durable domain models and their repository contracts.
//!
//! Entity CRUD itself is a thin data-access concern; the booking core
//! only depends on the trait surface defined in [`repository`].

pub mod order;
pub mod repository;
pub mod seat;
