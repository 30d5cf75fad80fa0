//! Admission gate in front of the booking endpoints.
//!
//! Requests without a valid admission token are redirected to the
//! waiting room instead of rejected, so browsers land on the queue page.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::debug;

use crate::state::AppState;

/// Where unadmitted callers are sent.
pub const WAITING_ROOM_PATH: &str = "/queue/waiting-room";

/// Path prefixes reachable without an admission token: the queue itself,
/// token minting, the position WebSocket, and health.
const OPEN_PREFIXES: &[&str] = &["/api/v1/auth", "/queue", "/ws", "/health"];

/// Middleware gating everything else behind a valid admission token.
pub async fn admission_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if is_open_path(path) {
        return next.run(request).await;
    }

    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if state.verifier.allows(authorization) {
        next.run(request).await
    } else {
        debug!(path, "No valid admission token, redirecting to waiting room");
        Redirect::temporary(WAITING_ROOM_PATH).into_response()
    }
}

/// Whether a path is reachable without admission.
fn is_open_path(path: &str) -> bool {
    OPEN_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_and_health_paths_are_open() {
        assert!(is_open_path("/queue/waiting-room"));
        assert!(is_open_path("/api/v1/auth/queue-token"));
        assert!(is_open_path("/ws/queue"));
        assert!(is_open_path("/health"));
    }

    #[test]
    fn booking_paths_are_gated() {
        assert!(!is_open_path("/api/bookings"));
        assert!(!is_open_path(
            "/api/bookings/0e9c9dd2-0000-0000-0000-000000000000/confirm"
        ));
    }
}
