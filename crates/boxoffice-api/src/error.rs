//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use boxoffice_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Response-layer wrapper around [`AppError`].
///
/// Handlers return `Result<_, ApiError>`; the `?` operator converts
/// through the `From` impl.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            // All three reservation races surface as 409: the request was
            // well-formed, somebody else just got there first.
            ErrorKind::Conflict
            | ErrorKind::InsufficientInventory
            | ErrorKind::LockContention
            | ErrorKind::SeatConflict => StatusCode::CONFLICT,
            ErrorKind::AdmissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Database
            | ErrorKind::Coordination
            | ErrorKind::Bus
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Internal => {
                tracing::error!(error = %self.0, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ApiErrorResponse {
            error: self.0.kind.to_string(),
            message: self.0.message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn reservation_races_map_to_conflict() {
        assert_eq!(
            status_of(AppError::insufficient_inventory("sold out")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::lock_contention("seats locked")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::seat_conflict("seat taken")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AppError::conflict("already confirmed")),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn remaining_kinds_map_as_expected() {
        assert_eq!(
            status_of(AppError::validation("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(AppError::not_found("gone")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AppError::admission_denied("not admitted")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::coordination("store down")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::service_unavailable("draining")),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
