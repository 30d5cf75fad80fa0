//! Waiting-room configuration.

use serde::{Deserialize, Serialize};

/// Settings for queue promotion and position streaming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum number of users promoted per event per promoter tick.
    #[serde(default = "default_batch_size")]
    pub promotion_batch_size: u64,
    /// Interval between queue-position pushes on a WebSocket, in seconds.
    #[serde(default = "default_position_interval")]
    pub position_interval_seconds: u64,
    /// TTL refreshed on each event's active-admission set after promotion,
    /// bounding stale admission state, in seconds.
    #[serde(default = "default_active_set_ttl")]
    pub active_set_ttl_seconds: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            promotion_batch_size: default_batch_size(),
            position_interval_seconds: default_position_interval(),
            active_set_ttl_seconds: default_active_set_ttl(),
        }
    }
}

fn default_batch_size() -> u64 {
    50
}

fn default_position_interval() -> u64 {
    2
}

fn default_active_set_ttl() -> u64 {
    1800
}
