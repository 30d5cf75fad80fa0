//! Coordination-store trait for pluggable backends.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::result::AppResult;

/// The shared coordination store used for counters, seat leases, expiry
/// markers, and waiting-room membership.
///
/// All cross-instance coordination goes through this store; request
/// handlers and background tasks never share in-process mutable state.
/// Keys are the logical keys from [`crate::keys`]; implementations apply
/// any deployment prefix themselves.
#[async_trait]
pub trait CoordinationStore: Send + Sync + std::fmt::Debug + 'static {
    // ── Availability counters ──────────────────────────────────

    /// Read a counter. Returns `None` if it has never been initialized.
    async fn counter_get(&self, key: &str) -> AppResult<Option<i64>>;

    /// Initialize a counter only if absent. Returns `true` if this call
    /// created it. Used for the lazy warm so two concurrent first bookings
    /// cannot double-initialize.
    async fn counter_init(&self, key: &str, value: i64) -> AppResult<bool>;

    /// Unconditionally set a counter (authoritative announcements only).
    async fn counter_set(&self, key: &str, value: i64) -> AppResult<()>;

    /// Atomically decrement `key` by `by` only if the current value is at
    /// least `by`. Returns `true` on success. This is the single
    /// linearization point for all concurrent reservation attempts against
    /// one event.
    async fn try_decrement(&self, key: &str, by: i64) -> AppResult<bool>;

    /// Increment a counter by `by`, returning the new value. Only
    /// rollback and compensation paths call this.
    async fn increment(&self, key: &str, by: i64) -> AppResult<i64>;

    /// Delete a key. Returns `true` if it existed.
    async fn delete(&self, key: &str) -> AppResult<bool>;

    // ── Seat leases ────────────────────────────────────────────

    /// Acquire time-bounded exclusive leases on every key in `keys` as one
    /// all-or-nothing operation, retrying until `wait` elapses. Returns the
    /// fencing token guarding the acquisition, or `None` if the combined
    /// lease could not be acquired in time. Implementations sort the keys
    /// so overlapping acquisitions cannot deadlock.
    async fn acquire_leases(
        &self,
        keys: &[String],
        wait: Duration,
        lease: Duration,
    ) -> AppResult<Option<String>>;

    /// Release the leases previously acquired under `token`. Keys whose
    /// lease already expired and was re-acquired by someone else are left
    /// untouched.
    async fn release_leases(&self, keys: &[String], token: &str) -> AppResult<()>;

    // ── Expiry markers ─────────────────────────────────────────

    /// Create a marker that expires after `ttl`. The marker's expiry (not
    /// its value) is the signal delivered on [`Self::subscribe_expired`].
    async fn set_marker(&self, key: &str, ttl: Duration) -> AppResult<()>;

    /// Remove a marker before it fires. Returns `true` if it still existed.
    async fn remove_marker(&self, key: &str) -> AppResult<bool>;

    /// Subscribe to key-expiry notifications. Delivery is at-least-once
    /// and best-effort; consumers must be idempotent.
    async fn subscribe_expired(&self) -> AppResult<mpsc::Receiver<String>>;

    // ── Ordered and plain sets ─────────────────────────────────

    /// Add (or re-score) a member of a score-ordered set.
    async fn zset_add(&self, key: &str, member: &str, score: f64) -> AppResult<()>;

    /// 0-based rank of a member by ascending score, `None` if absent.
    async fn zset_rank(&self, key: &str, member: &str) -> AppResult<Option<u64>>;

    /// Atomically pop up to `count` lowest-score members of `from` and add
    /// them to the plain set `into`, returning the popped members in score
    /// order. The pop and insert are one indivisible operation.
    async fn pop_min_into_set(&self, from: &str, into: &str, count: u64)
        -> AppResult<Vec<String>>;

    /// Add a member to a plain set.
    async fn set_add(&self, key: &str, member: &str) -> AppResult<()>;

    /// Membership test on a plain set.
    async fn set_contains(&self, key: &str, member: &str) -> AppResult<bool>;

    // ── Misc ───────────────────────────────────────────────────

    /// Set or refresh a TTL on an existing key. Returns `false` if the key
    /// does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<bool>;

    /// List keys matching a glob-style pattern (e.g. `queue:waiting:*`).
    async fn scan_keys(&self, pattern: &str) -> AppResult<Vec<String>>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
