//! Admission tokens for the waiting-room gate.
//!
//! Users admitted from the waiting queue receive a short-lived JWT scoped
//! to a single event. Protected booking endpoints require a valid token;
//! everyone else is redirected to the waiting room.

pub mod admission;

pub use admission::claims::AdmissionClaims;
pub use admission::encoder::AdmissionEncoder;
pub use admission::service::AdmissionService;
pub use admission::verifier::AdmissionVerifier;
