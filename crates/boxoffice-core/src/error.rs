//! Unified application error types for Boxoffice.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, concurrent modification, etc.).
    Conflict,
    /// Not enough tickets remain to satisfy the request.
    InsufficientInventory,
    /// The seat leases could not all be acquired within the wait bound.
    LockContention,
    /// A seat was no longer available once the lease was held.
    SeatConflict,
    /// The caller does not hold a valid admission credential.
    AdmissionDenied,
    /// A database error occurred.
    Database,
    /// A coordination-store error occurred.
    Coordination,
    /// An event-bus error occurred.
    Bus,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
    /// The service is temporarily unavailable.
    ServiceUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::InsufficientInventory => write!(f, "INSUFFICIENT_INVENTORY"),
            Self::LockContention => write!(f, "LOCK_CONTENTION"),
            Self::SeatConflict => write!(f, "SEAT_CONFLICT"),
            Self::AdmissionDenied => write!(f, "ADMISSION_DENIED"),
            Self::Database => write!(f, "DATABASE"),
            Self::Coordination => write!(f, "COORDINATION"),
            Self::Bus => write!(f, "BUS"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
        }
    }
}

/// The unified application error used throughout Boxoffice.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an insufficient-inventory error.
    pub fn insufficient_inventory(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientInventory, message)
    }

    /// Create a lock-contention error.
    pub fn lock_contention(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LockContention, message)
    }

    /// Create a seat-conflict error.
    pub fn seat_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SeatConflict, message)
    }

    /// Create an admission-denied error.
    pub fn admission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AdmissionDenied, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a coordination-store error.
    pub fn coordination(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Coordination, message)
    }

    /// Create an event-bus error.
    pub fn bus(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Bus, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
