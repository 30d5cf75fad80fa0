//! Traits decoupling the core subsystems from their backends.

pub mod bus;
pub mod store;

pub use bus::EventBus;
pub use store::CoordinationStore;
