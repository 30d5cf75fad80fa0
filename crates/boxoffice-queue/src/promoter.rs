//! Rate-limited promotion from waiting queues into active sets.

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{error, info, warn};

use boxoffice_core::config::queue::QueueConfig;
use boxoffice_core::error::AppError;
use boxoffice_core::keys;
use boxoffice_core::result::AppResult;
use boxoffice_core::traits::CoordinationStore;

/// Moves the head of each event's waiting queue into its active set.
#[derive(Debug, Clone)]
pub struct QueuePromoter {
    /// Coordination store holding the queues.
    store: Arc<dyn CoordinationStore>,
    /// Promotion batch size and active-set TTL.
    config: QueueConfig,
}

impl QueuePromoter {
    /// Creates a new promoter.
    pub fn new(store: Arc<dyn CoordinationStore>, config: QueueConfig) -> Self {
        Self { store, config }
    }

    /// One promotion tick over every event's waiting queue.
    ///
    /// Per event, at most `promotion_batch_size` users move per tick; the
    /// tick cadence is what bounds the admission rate. Returns the total
    /// number of users promoted.
    pub async fn promote_once(&self) -> AppResult<u64> {
        let waiting_keys = self.store.scan_keys(&keys::queue_waiting_pattern()).await?;
        let mut total = 0u64;

        for waiting_key in waiting_keys {
            let Some(event_id) = keys::parse_queue_waiting(&waiting_key) else {
                warn!(key = %waiting_key, "Skipping unparseable waiting-queue key");
                continue;
            };

            let active_key = keys::queue_active(event_id);
            let promoted = self
                .store
                .pop_min_into_set(&waiting_key, &active_key, self.config.promotion_batch_size)
                .await?;

            if promoted.is_empty() {
                continue;
            }

            // Bound how long admission outlives the rush.
            self.store
                .expire(
                    &active_key,
                    Duration::from_secs(self.config.active_set_ttl_seconds),
                )
                .await?;

            info!(event_id, admitted = promoted.len(), "Promoted queue head");
            total += promoted.len() as u64;
        }

        Ok(total)
    }
}

/// Runs the promoter on a fixed cron cadence.
pub struct PromotionScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
}

impl std::fmt::Debug for PromotionScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromotionScheduler").finish()
    }
}

impl PromotionScheduler {
    /// Create a scheduler ticking the promoter once per second.
    pub async fn new(promoter: Arc<QueuePromoter>) -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        let job = CronJob::new_async("* * * * * *", move |_uuid, _lock| {
            let promoter = Arc::clone(&promoter);
            Box::pin(async move {
                if let Err(e) = promoter.promote_once().await {
                    error!(error = %e, "Promotion tick failed");
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create promotion schedule: {e}")))?;

        scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add promotion schedule: {e}")))?;

        Ok(Self { scheduler })
    }

    /// Start the scheduler.
    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;
        info!("Promotion scheduler started (every 1s)");
        Ok(())
    }

    /// Shut down the scheduler.
    pub async fn shutdown(&mut self) -> AppResult<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;
        info!("Promotion scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use boxoffice_store::MemoryStore;

    use super::*;

    fn promoter(store: Arc<MemoryStore>, batch: u64) -> QueuePromoter {
        QueuePromoter::new(
            store,
            QueueConfig {
                promotion_batch_size: batch,
                ..QueueConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn promotes_in_arrival_order_up_to_the_batch_size() {
        let store = Arc::new(MemoryStore::new());
        store
            .zset_add(&keys::queue_waiting(7), "u-1", 100.0)
            .await
            .unwrap();
        store
            .zset_add(&keys::queue_waiting(7), "u-2", 200.0)
            .await
            .unwrap();
        store
            .zset_add(&keys::queue_waiting(7), "u-3", 300.0)
            .await
            .unwrap();

        let promoter = promoter(store.clone(), 2);

        assert_eq!(promoter.promote_once().await.unwrap(), 2);
        assert!(store.set_contains(&keys::queue_active(7), "u-1").await.unwrap());
        assert!(store.set_contains(&keys::queue_active(7), "u-2").await.unwrap());
        assert!(!store.set_contains(&keys::queue_active(7), "u-3").await.unwrap());

        // The straggler goes on the next tick.
        assert_eq!(promoter.promote_once().await.unwrap(), 1);
        assert!(store.set_contains(&keys::queue_active(7), "u-3").await.unwrap());
    }

    #[tokio::test]
    async fn each_event_queue_is_drained_independently() {
        let store = Arc::new(MemoryStore::new());
        store
            .zset_add(&keys::queue_waiting(1), "a-1", 100.0)
            .await
            .unwrap();
        store
            .zset_add(&keys::queue_waiting(2), "b-1", 100.0)
            .await
            .unwrap();
        store
            .zset_add(&keys::queue_waiting(2), "b-2", 200.0)
            .await
            .unwrap();

        let promoter = promoter(store.clone(), 50);

        assert_eq!(promoter.promote_once().await.unwrap(), 3);
        assert!(store.set_contains(&keys::queue_active(1), "a-1").await.unwrap());
        assert!(store.set_contains(&keys::queue_active(2), "b-2").await.unwrap());
    }

    #[tokio::test]
    async fn empty_queues_promote_nobody() {
        let promoter = promoter(Arc::new(MemoryStore::new()), 50);
        assert_eq!(promoter.promote_once().await.unwrap(), 0);
    }
}
