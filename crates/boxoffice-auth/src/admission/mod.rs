//! Admission token issuance and verification.

pub mod claims;
pub mod encoder;
pub mod service;
pub mod verifier;
