//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use boxoffice_auth::{AdmissionService, AdmissionVerifier};
use boxoffice_booking::{ConfirmationService, ReservationCoordinator};
use boxoffice_core::config::AppConfig;
use boxoffice_core::traits::CoordinationStore;
use boxoffice_entity::repository::OrderRepository;
use boxoffice_queue::WaitingRoom;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Coordination store (counters, leases, queues).
    pub store: Arc<dyn CoordinationStore>,
    /// Reservation saga coordinator.
    pub coordinator: Arc<ReservationCoordinator>,
    /// Reservation confirmation service.
    pub confirmation: Arc<ConfirmationService>,
    /// Durable orders, for lookups.
    pub orders: Arc<dyn OrderRepository>,
    /// Waiting-room queue operations.
    pub waiting_room: Arc<WaitingRoom>,
    /// Admission token minting.
    pub admission: Arc<AdmissionService>,
    /// Admission token verification at the gate.
    pub verifier: Arc<AdmissionVerifier>,
}
