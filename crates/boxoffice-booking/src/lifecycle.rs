//! Event lifecycle consumer.
//!
//! Keeps availability counters authoritative: a PUBLISHED announcement
//! overwrites the counter with the published inventory, a CANCELLED
//! announcement tears down the event's counter and queues.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use boxoffice_core::events::TOPIC_LIFECYCLE;
use boxoffice_core::events::lifecycle::{EventLifecycle, LifecycleKind};
use boxoffice_core::keys;
use boxoffice_core::result::AppResult;
use boxoffice_core::traits::{CoordinationStore, EventBus};

/// Consumes `events.lifecycle` announcements.
#[derive(Debug, Clone)]
pub struct LifecycleConsumer {
    /// Coordination store holding counters and queues.
    store: Arc<dyn CoordinationStore>,
    /// Event bus to subscribe on.
    bus: Arc<dyn EventBus>,
}

impl LifecycleConsumer {
    /// Creates a new lifecycle consumer.
    pub fn new(store: Arc<dyn CoordinationStore>, bus: Arc<dyn EventBus>) -> Self {
        Self { store, bus }
    }

    /// Run until the cancel signal is received.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) -> AppResult<()> {
        let mut messages = self.bus.subscribe(TOPIC_LIFECYCLE).await?;
        info!("Lifecycle consumer started");

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!("Lifecycle consumer received shutdown signal");
                        break;
                    }
                }
                next = messages.recv() => {
                    match next {
                        Some(payload) => {
                            if let Err(e) = self.handle_message(&payload).await {
                                warn!(error = %e, "Failed to process lifecycle message");
                            }
                        }
                        None => {
                            warn!("Lifecycle subscription ended");
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Process one lifecycle message.
    pub async fn handle_message(&self, payload: &str) -> AppResult<()> {
        let message: EventLifecycle = serde_json::from_str(payload)?;

        match message.kind {
            LifecycleKind::Created => {
                debug!(event_id = message.event_id, "Event created, not yet on sale");
            }
            LifecycleKind::Published => {
                self.store
                    .counter_set(
                        &keys::tickets_available(message.event_id),
                        message.total_inventory,
                    )
                    .await?;
                info!(
                    event_id = message.event_id,
                    inventory = message.total_inventory,
                    "Event published, counter set"
                );
            }
            LifecycleKind::Cancelled => {
                self.store
                    .delete(&keys::tickets_available(message.event_id))
                    .await?;
                self.store
                    .delete(&keys::queue_waiting(message.event_id))
                    .await?;
                self.store
                    .delete(&keys::queue_active(message.event_id))
                    .await?;
                info!(event_id = message.event_id, "Event cancelled, state torn down");
            }
        }
        Ok(())
    }
}
