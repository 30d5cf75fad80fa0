//! Seat reservation configuration.

use serde::{Deserialize, Serialize};

/// Settings for the reservation saga and its expiry compensation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// How long a PENDING reservation may await confirmation before it is
    /// cancelled and its seats released, in seconds.
    #[serde(default = "default_reservation_ttl")]
    pub reservation_ttl_seconds: u64,
    /// Upper bound on waiting for the combined seat leases, in milliseconds.
    #[serde(default = "default_lock_wait")]
    pub lock_wait_ms: u64,
    /// Lease duration for each seat lock, in milliseconds. Must comfortably
    /// cover the validate-and-persist critical section.
    #[serde(default = "default_lock_lease")]
    pub lock_lease_ms: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            reservation_ttl_seconds: default_reservation_ttl(),
            lock_wait_ms: default_lock_wait(),
            lock_lease_ms: default_lock_lease(),
        }
    }
}

fn default_reservation_ttl() -> u64 {
    300
}

fn default_lock_wait() -> u64 {
    3000
}

fn default_lock_lease() -> u64 {
    10000
}
