//! Seat reservation and its compensation paths.
//!
//! The reservation saga lives in [`coordinator`]; its two resolution
//! paths are [`confirmation`] (payment arrived in time) and
//! [`compensator`] (the reservation's expiry marker fired first).
//! [`lifecycle`] keeps availability counters in step with event
//! publication and cancellation.

pub mod compensator;
pub mod confirmation;
pub mod coordinator;
pub mod lifecycle;

#[cfg(test)]
pub mod testutil;

pub use compensator::ExpiryCompensator;
pub use confirmation::ConfirmationService;
pub use coordinator::{Reservation, ReservationCoordinator};
pub use lifecycle::LifecycleConsumer;
