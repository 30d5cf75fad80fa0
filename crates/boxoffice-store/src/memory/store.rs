//! In-memory coordination store.
//!
//! Single-process stand-in for the Redis backend. TTLs are not tracked by
//! a timer; tests drive expiry deterministically through
//! [`MemoryStore::force_expire`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;
use uuid::Uuid;

use boxoffice_core::result::AppResult;
use boxoffice_core::traits::store::CoordinationStore;

/// Interval between retries while waiting for a contended multi-lease.
const LEASE_RETRY_INTERVAL: Duration = Duration::from_millis(5);

/// Channel capacity for expired-key notifications.
const EXPIRY_CHANNEL_CAPACITY: usize = 256;

/// In-memory [`CoordinationStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Numeric counters.
    counters: Arc<DashMap<String, i64>>,
    /// Lease key to fencing token.
    leases: Arc<DashMap<String, String>>,
    /// TTL marker keys.
    markers: Arc<DashMap<String, ()>>,
    /// Sorted sets as member/score pairs.
    zsets: Arc<DashMap<String, Vec<(String, f64)>>>,
    /// Plain sets.
    sets: Arc<DashMap<String, HashSet<String>>>,
    /// Serializes multi-lease acquisition so it is all-or-nothing.
    lease_guard: Arc<Mutex<()>>,
    /// Subscribers to expiry notifications.
    expiry_subscribers: Arc<Mutex<Vec<mpsc::Sender<String>>>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire a key now, notifying every expiry subscriber.
    ///
    /// Notification is sent even when the marker was already removed,
    /// mirroring the at-least-once delivery of Redis keyspace events.
    pub async fn force_expire(&self, key: &str) {
        self.markers.remove(key);
        let subscribers = self.expiry_subscribers.lock().await;
        for tx in subscribers.iter() {
            let _ = tx.send(key.to_string()).await;
        }
    }

    /// Whether a marker key currently exists.
    pub fn has_marker(&self, key: &str) -> bool {
        self.markers.contains_key(key)
    }

    /// Members of a plain set, for assertions.
    pub fn set_members(&self, key: &str) -> Vec<String> {
        let mut members: Vec<String> = self
            .sets
            .get(key)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default();
        members.sort();
        members
    }

    fn sorted_members(entries: &[(String, f64)]) -> Vec<(String, f64)> {
        let mut sorted = entries.to_vec();
        sorted.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        sorted
    }

    fn key_exists(&self, key: &str) -> bool {
        self.counters.contains_key(key)
            || self.leases.contains_key(key)
            || self.markers.contains_key(key)
            || self.zsets.contains_key(key)
            || self.sets.contains_key(key)
    }

    fn matches(pattern: &str, key: &str) -> bool {
        match pattern.strip_suffix('*') {
            Some(prefix) => key.starts_with(prefix),
            None => key == pattern,
        }
    }
}

#[async_trait]
impl CoordinationStore for MemoryStore {
    async fn counter_get(&self, key: &str) -> AppResult<Option<i64>> {
        Ok(self.counters.get(key).map(|v| *v))
    }

    async fn counter_init(&self, key: &str, value: i64) -> AppResult<bool> {
        match self.counters.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Ok(false),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(true)
            }
        }
    }

    async fn counter_set(&self, key: &str, value: i64) -> AppResult<()> {
        self.counters.insert(key.to_string(), value);
        Ok(())
    }

    async fn try_decrement(&self, key: &str, by: i64) -> AppResult<bool> {
        let mut current = self.counters.entry(key.to_string()).or_insert(0);
        if *current < by {
            return Ok(false);
        }
        *current -= by;
        Ok(true)
    }

    async fn increment(&self, key: &str, by: i64) -> AppResult<i64> {
        let mut current = self.counters.entry(key.to_string()).or_insert(0);
        *current += by;
        Ok(*current)
    }

    async fn delete(&self, key: &str) -> AppResult<bool> {
        let existed = self.key_exists(key);
        self.counters.remove(key);
        self.leases.remove(key);
        self.markers.remove(key);
        self.zsets.remove(key);
        self.sets.remove(key);
        Ok(existed)
    }

    async fn acquire_leases(
        &self,
        keys: &[String],
        wait: Duration,
        _lease: Duration,
    ) -> AppResult<Option<String>> {
        let mut sorted: Vec<String> = keys.to_vec();
        sorted.sort();

        let token = Uuid::new_v4().to_string();
        let deadline = Instant::now() + wait;

        loop {
            {
                let _guard = self.lease_guard.lock().await;
                if sorted.iter().all(|k| !self.leases.contains_key(k)) {
                    for key in &sorted {
                        self.leases.insert(key.clone(), token.clone());
                    }
                    return Ok(Some(token));
                }
            }
            if Instant::now() + LEASE_RETRY_INTERVAL > deadline {
                return Ok(None);
            }
            tokio::time::sleep(LEASE_RETRY_INTERVAL).await;
        }
    }

    async fn release_leases(&self, keys: &[String], token: &str) -> AppResult<()> {
        for key in keys {
            self.leases.remove_if(key, |_, owner| owner == token);
        }
        Ok(())
    }

    async fn set_marker(&self, key: &str, _ttl: Duration) -> AppResult<()> {
        self.markers.insert(key.to_string(), ());
        Ok(())
    }

    async fn remove_marker(&self, key: &str) -> AppResult<bool> {
        Ok(self.markers.remove(key).is_some())
    }

    async fn subscribe_expired(&self) -> AppResult<mpsc::Receiver<String>> {
        let (tx, rx) = mpsc::channel(EXPIRY_CHANNEL_CAPACITY);
        self.expiry_subscribers.lock().await.push(tx);
        Ok(rx)
    }

    async fn zset_add(&self, key: &str, member: &str, score: f64) -> AppResult<()> {
        let mut entries = self.zsets.entry(key.to_string()).or_default();
        match entries.iter_mut().find(|(m, _)| m == member) {
            Some(entry) => entry.1 = score,
            None => entries.push((member.to_string(), score)),
        }
        Ok(())
    }

    async fn zset_rank(&self, key: &str, member: &str) -> AppResult<Option<u64>> {
        let Some(entries) = self.zsets.get(key) else {
            return Ok(None);
        };
        let rank = Self::sorted_members(&entries)
            .iter()
            .position(|(m, _)| m == member)
            .map(|p| p as u64);
        Ok(rank)
    }

    async fn pop_min_into_set(&self, from: &str, into: &str, count: u64) -> AppResult<Vec<String>> {
        let popped = {
            let Some(mut entries) = self.zsets.get_mut(from) else {
                return Ok(Vec::new());
            };
            let sorted = Self::sorted_members(&entries);
            let popped: Vec<String> = sorted
                .into_iter()
                .take(count as usize)
                .map(|(m, _)| m)
                .collect();
            entries.retain(|(m, _)| !popped.contains(m));
            popped
        };

        if !popped.is_empty() {
            let mut set = self.sets.entry(into.to_string()).or_default();
            for member in &popped {
                set.insert(member.clone());
            }
        }
        Ok(popped)
    }

    async fn set_add(&self, key: &str, member: &str) -> AppResult<()> {
        self.sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn set_contains(&self, key: &str, member: &str) -> AppResult<bool> {
        Ok(self
            .sets
            .get(key)
            .map(|s| s.contains(member))
            .unwrap_or(false))
    }

    async fn expire(&self, key: &str, _ttl: Duration) -> AppResult<bool> {
        Ok(self.key_exists(key))
    }

    async fn scan_keys(&self, pattern: &str) -> AppResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .counters
            .iter()
            .map(|e| e.key().clone())
            .chain(self.leases.iter().map(|e| e.key().clone()))
            .chain(self.markers.iter().map(|e| e.key().clone()))
            .chain(self.zsets.iter().map(|e| e.key().clone()))
            .chain(self.sets.iter().map(|e| e.key().clone()))
            .filter(|k| Self::matches(pattern, k))
            .collect();
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counter_init_is_idempotent() {
        let store = MemoryStore::new();

        assert!(store.counter_init("tickets:available:1", 100).await.unwrap());
        assert!(!store.counter_init("tickets:available:1", 50).await.unwrap());
        assert_eq!(
            store.counter_get("tickets:available:1").await.unwrap(),
            Some(100)
        );
    }

    #[tokio::test]
    async fn try_decrement_refuses_overdraw() {
        let store = MemoryStore::new();
        store.counter_set("tickets:available:1", 3).await.unwrap();

        assert!(store.try_decrement("tickets:available:1", 2).await.unwrap());
        assert!(!store.try_decrement("tickets:available:1", 2).await.unwrap());
        assert_eq!(
            store.counter_get("tickets:available:1").await.unwrap(),
            Some(1)
        );
    }

    #[tokio::test]
    async fn try_decrement_treats_missing_counter_as_zero() {
        let store = MemoryStore::new();
        assert!(!store.try_decrement("tickets:available:9", 1).await.unwrap());
    }

    #[tokio::test]
    async fn multi_lease_is_all_or_nothing() {
        let store = MemoryStore::new();
        let first = vec!["seat_lock:1:a".to_string(), "seat_lock:1:b".to_string()];
        let overlapping = vec!["seat_lock:1:b".to_string(), "seat_lock:1:c".to_string()];

        let token = store
            .acquire_leases(&first, Duration::ZERO, Duration::from_secs(10))
            .await
            .unwrap()
            .expect("uncontended acquisition succeeds");

        let blocked = store
            .acquire_leases(&overlapping, Duration::ZERO, Duration::from_secs(10))
            .await
            .unwrap();
        assert!(blocked.is_none());

        // The overlapping attempt must not have claimed the free key.
        let free = vec!["seat_lock:1:c".to_string()];
        assert!(
            store
                .acquire_leases(&free, Duration::ZERO, Duration::from_secs(10))
                .await
                .unwrap()
                .is_some()
        );

        store.release_leases(&first, &token).await.unwrap();
        assert!(
            store
                .acquire_leases(&first, Duration::ZERO, Duration::from_secs(10))
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn release_ignores_foreign_token() {
        let store = MemoryStore::new();
        let keys = vec!["seat_lock:1:a".to_string()];

        store
            .acquire_leases(&keys, Duration::ZERO, Duration::from_secs(10))
            .await
            .unwrap()
            .unwrap();
        store.release_leases(&keys, "not-the-owner").await.unwrap();

        assert!(
            store
                .acquire_leases(&keys, Duration::ZERO, Duration::from_secs(10))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn zset_rank_orders_by_score_then_member() {
        let store = MemoryStore::new();
        store.zset_add("queue:waiting:1", "u2", 200.0).await.unwrap();
        store.zset_add("queue:waiting:1", "u1", 100.0).await.unwrap();
        store.zset_add("queue:waiting:1", "u3", 300.0).await.unwrap();

        assert_eq!(store.zset_rank("queue:waiting:1", "u1").await.unwrap(), Some(0));
        assert_eq!(store.zset_rank("queue:waiting:1", "u3").await.unwrap(), Some(2));
        assert_eq!(store.zset_rank("queue:waiting:1", "absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn pop_min_moves_lowest_scores_into_set() {
        let store = MemoryStore::new();
        store.zset_add("queue:waiting:1", "u1", 100.0).await.unwrap();
        store.zset_add("queue:waiting:1", "u2", 200.0).await.unwrap();
        store.zset_add("queue:waiting:1", "u3", 300.0).await.unwrap();

        let moved = store
            .pop_min_into_set("queue:waiting:1", "queue:active:1", 2)
            .await
            .unwrap();

        assert_eq!(moved, vec!["u1".to_string(), "u2".to_string()]);
        assert!(store.set_contains("queue:active:1", "u1").await.unwrap());
        assert!(store.set_contains("queue:active:1", "u2").await.unwrap());
        assert!(!store.set_contains("queue:active:1", "u3").await.unwrap());
        assert_eq!(store.zset_rank("queue:waiting:1", "u3").await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn force_expire_notifies_subscribers() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe_expired().await.unwrap();

        store
            .set_marker("order_expiry:abc", Duration::from_secs(300))
            .await
            .unwrap();
        store.force_expire("order_expiry:abc").await;

        assert_eq!(rx.recv().await.unwrap(), "order_expiry:abc");
        assert!(!store.has_marker("order_expiry:abc"));
    }

    #[tokio::test]
    async fn scan_keys_matches_glob_prefix() {
        let store = MemoryStore::new();
        store.zset_add("queue:waiting:1", "u1", 1.0).await.unwrap();
        store.zset_add("queue:waiting:7", "u2", 1.0).await.unwrap();
        store.set_add("queue:active:1", "u3").await.unwrap();

        let keys = store.scan_keys("queue:waiting:*").await.unwrap();
        assert_eq!(keys, vec!["queue:waiting:1", "queue:waiting:7"]);
    }
}
