//! Boxoffice server: ticket inventory and admission control.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use boxoffice_core::config::AppConfig;
use boxoffice_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("BOXOFFICE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Boxoffice v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db_pool = boxoffice_database::connection::create_pool(&config.database).await?;

    tracing::info!("Running database migrations...");
    boxoffice_database::migration::run_migrations(&db_pool).await?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Coordination store and event bus ─────────────────
    let redis_client = boxoffice_store::redis::RedisClient::connect(&config.store).await?;
    let store: Arc<dyn boxoffice_core::traits::CoordinationStore> =
        Arc::new(boxoffice_store::RedisStore::new(redis_client));

    let bus: Arc<dyn boxoffice_core::traits::EventBus> =
        Arc::new(boxoffice_bus::RedisEventBus::connect(&config.store.url).await?);

    // ── Step 3: Repositories ─────────────────────────────────────
    let orders: Arc<dyn boxoffice_entity::repository::OrderRepository> = Arc::new(
        boxoffice_database::repositories::order::PgOrderRepository::new(db_pool.clone()),
    );
    let seats: Arc<dyn boxoffice_entity::repository::SeatRepository> = Arc::new(
        boxoffice_database::repositories::seat::PgSeatRepository::new(db_pool.clone()),
    );

    // ── Step 4: Booking services ─────────────────────────────────
    let coordinator = Arc::new(boxoffice_booking::ReservationCoordinator::new(
        Arc::clone(&store),
        Arc::clone(&bus),
        Arc::clone(&orders),
        Arc::clone(&seats),
        config.booking.clone(),
    ));
    let confirmation = Arc::new(boxoffice_booking::ConfirmationService::new(
        Arc::clone(&store),
        Arc::clone(&bus),
        Arc::clone(&orders),
        Arc::clone(&seats),
    ));
    let compensator = boxoffice_booking::ExpiryCompensator::new(
        Arc::clone(&store),
        Arc::clone(&bus),
        Arc::clone(&orders),
    );
    let lifecycle =
        boxoffice_booking::LifecycleConsumer::new(Arc::clone(&store), Arc::clone(&bus));

    // ── Step 5: Admission and waiting room ───────────────────────
    let encoder = boxoffice_auth::AdmissionEncoder::new(&config.auth);
    let verifier = Arc::new(boxoffice_auth::AdmissionVerifier::new(&config.auth));
    let admission = Arc::new(boxoffice_auth::AdmissionService::new(
        Arc::clone(&store),
        encoder,
    ));
    let waiting_room = Arc::new(boxoffice_queue::WaitingRoom::new(Arc::clone(&store)));
    let promoter = Arc::new(boxoffice_queue::QueuePromoter::new(
        Arc::clone(&store),
        config.queue.clone(),
    ));

    // ── Step 6: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 7: Background tasks ─────────────────────────────────
    tracing::info!("Starting expiry compensator...");
    let compensator_cancel = shutdown_rx.clone();
    let compensator_handle = tokio::spawn(async move {
        if let Err(e) = compensator.run(compensator_cancel).await {
            tracing::error!("Expiry compensator error: {e}");
        }
    });

    tracing::info!("Starting lifecycle consumer...");
    let lifecycle_cancel = shutdown_rx.clone();
    let lifecycle_handle = tokio::spawn(async move {
        if let Err(e) = lifecycle.run(lifecycle_cancel).await {
            tracing::error!("Lifecycle consumer error: {e}");
        }
    });

    tracing::info!("Starting promotion scheduler...");
    let mut scheduler = boxoffice_queue::PromotionScheduler::new(Arc::clone(&promoter)).await?;
    scheduler.start().await?;

    // ── Step 8: Build and start HTTP server ──────────────────────
    tracing::info!(
        "Starting HTTP server on {}:{}...",
        config.server.host,
        config.server.port
    );

    let app_state = boxoffice_api::AppState {
        config: Arc::new(config.clone()),
        db_pool: db_pool.clone(),
        store: Arc::clone(&store),
        coordinator,
        confirmation,
        orders,
        waiting_room,
        admission,
        verifier,
    };

    let app = boxoffice_api::build_router(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Boxoffice server listening on {addr}");

    // ── Step 9: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 10: Wait for background tasks ───────────────────────
    tracing::info!("Waiting for background tasks to complete...");
    scheduler.shutdown().await?;
    let _ = tokio::time::timeout(std::time::Duration::from_secs(10), compensator_handle).await;
    let _ = tokio::time::timeout(std::time::Duration::from_secs(10), lifecycle_handle).await;

    tracing::info!("Boxoffice server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
