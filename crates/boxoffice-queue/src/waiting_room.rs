//! Joining and polling the per-event waiting queue.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use boxoffice_core::keys;
use boxoffice_core::result::AppResult;
use boxoffice_core::traits::CoordinationStore;

/// Where a user currently stands for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    /// Admitted past the waiting room.
    Promoted,
    /// Still queued, at this 1-based position.
    Waiting {
        /// 1-based position by arrival order.
        position: u64,
    },
}

/// Per-event FIFO waiting queue backed by the coordination store.
#[derive(Debug, Clone)]
pub struct WaitingRoom {
    /// Coordination store holding the waiting and active sets.
    store: Arc<dyn CoordinationStore>,
}

impl WaitingRoom {
    /// Creates a new waiting room.
    pub fn new(store: Arc<dyn CoordinationStore>) -> Self {
        Self { store }
    }

    /// Enqueue a user for an event, scored by arrival time.
    ///
    /// Rejoining re-scores the entry, so a reconnecting user goes to the
    /// back of the queue rather than holding a stale slot. Users already
    /// admitted are left alone.
    pub async fn join(&self, event_id: i64, user_id: &str) -> AppResult<()> {
        if self
            .store
            .set_contains(&keys::queue_active(event_id), user_id)
            .await?
        {
            debug!(event_id, user_id, "Already admitted, not re-queueing");
            return Ok(());
        }

        let arrival = Utc::now().timestamp_millis() as f64;
        self.store
            .zset_add(&keys::queue_waiting(event_id), user_id, arrival)
            .await?;
        debug!(event_id, user_id, "Joined waiting queue");
        Ok(())
    }

    /// Current status of a user for an event.
    ///
    /// A user absent from both the active set and the waiting queue is
    /// reported as promoted: the promoter removes queue entries at the
    /// moment of admission, and the active set's TTL may already have
    /// swept the membership record.
    pub async fn status(&self, event_id: i64, user_id: &str) -> AppResult<QueueStatus> {
        if self
            .store
            .set_contains(&keys::queue_active(event_id), user_id)
            .await?
        {
            return Ok(QueueStatus::Promoted);
        }

        match self
            .store
            .zset_rank(&keys::queue_waiting(event_id), user_id)
            .await?
        {
            Some(rank) => Ok(QueueStatus::Waiting { position: rank + 1 }),
            None => Ok(QueueStatus::Promoted),
        }
    }
}

#[cfg(test)]
mod tests {
    use boxoffice_store::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn arrivals_queue_in_fifo_order() {
        let store = Arc::new(MemoryStore::new());
        let room = WaitingRoom::new(store);

        room.join(7, "u-1").await.unwrap();
        room.join(7, "u-2").await.unwrap();
        room.join(7, "u-3").await.unwrap();

        assert_eq!(
            room.status(7, "u-1").await.unwrap(),
            QueueStatus::Waiting { position: 1 }
        );
        assert_eq!(
            room.status(7, "u-3").await.unwrap(),
            QueueStatus::Waiting { position: 3 }
        );
    }

    #[tokio::test]
    async fn active_membership_reports_promoted() {
        let store = Arc::new(MemoryStore::new());
        store.set_add(&keys::queue_active(7), "u-1").await.unwrap();
        let room = WaitingRoom::new(store);

        assert_eq!(room.status(7, "u-1").await.unwrap(), QueueStatus::Promoted);
    }

    #[tokio::test]
    async fn absence_from_both_sets_reports_promoted() {
        let room = WaitingRoom::new(Arc::new(MemoryStore::new()));
        assert_eq!(room.status(7, "u-1").await.unwrap(), QueueStatus::Promoted);
    }

    #[tokio::test]
    async fn admitted_user_is_not_requeued() {
        let store = Arc::new(MemoryStore::new());
        store.set_add(&keys::queue_active(7), "u-1").await.unwrap();
        let room = WaitingRoom::new(store.clone());

        room.join(7, "u-1").await.unwrap();
        assert_eq!(
            store
                .zset_rank(&keys::queue_waiting(7), "u-1")
                .await
                .unwrap(),
            None
        );
    }
}
