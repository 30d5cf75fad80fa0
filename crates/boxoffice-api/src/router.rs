//! Route definitions for the Boxoffice HTTP API.
//!
//! The admission gate wraps the whole router; its open-prefix list keeps
//! the queue, token minting, WebSocket, and health paths reachable.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let booking_routes = Router::new()
        .route("/bookings", post(handlers::booking::reserve))
        .route("/bookings/{id}", get(handlers::booking::get_order))
        .route("/bookings/{id}/confirm", post(handlers::booking::confirm));

    let token_routes = Router::new().route(
        "/v1/auth/queue-token",
        post(handlers::queue::queue_token),
    );

    let queue_routes = Router::new().route("/waiting-room", get(handlers::queue::waiting_room));

    let ws_routes = Router::new().route("/queue", get(handlers::ws::queue_ws));

    Router::new()
        .nest("/api", booking_routes.merge(token_routes))
        .nest("/queue", queue_routes)
        .nest("/ws", ws_routes)
        .route("/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::admission::admission_gate,
        ))
        .with_state(state)
}
