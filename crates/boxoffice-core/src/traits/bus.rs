//! Event-bus trait for pluggable transports.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::result::AppResult;

/// Publish/subscribe transport used to announce lifecycle changes to the
/// rest of the platform (search indexing, notifications, analytics).
///
/// Payloads are the canonical JSON shapes from [`crate::events`], already
/// serialized by the caller.
#[async_trait]
pub trait EventBus: Send + Sync + std::fmt::Debug + 'static {
    /// Publish a serialized message on a topic.
    async fn publish(&self, topic: &str, payload: &str) -> AppResult<()>;

    /// Subscribe to a topic, receiving every message published after the
    /// subscription was established.
    async fn subscribe(&self, topic: &str) -> AppResult<mpsc::Receiver<String>>;
}
