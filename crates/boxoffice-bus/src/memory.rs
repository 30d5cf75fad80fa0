//! In-memory event bus for single-process tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use boxoffice_core::result::AppResult;
use boxoffice_core::traits::EventBus;

/// Channel capacity per subscription.
const SUBSCRIPTION_CAPACITY: usize = 256;

/// In-memory [`EventBus`].
///
/// Keeps a log of everything published so tests can assert on emitted
/// events without subscribing ahead of time.
#[derive(Debug, Default)]
pub struct MemoryBus {
    /// Topic to subscriber channels.
    subscribers: Mutex<HashMap<String, Vec<mpsc::Sender<String>>>>,
    /// Every (topic, payload) published, in order.
    log: Mutex<Vec<(String, String)>>,
}

impl MemoryBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads published to a topic so far.
    pub async fn published(&self, topic: &str) -> Vec<String> {
        self.log
            .lock()
            .await
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[async_trait]
impl EventBus for MemoryBus {
    async fn publish(&self, topic: &str, payload: &str) -> AppResult<()> {
        self.log
            .lock()
            .await
            .push((topic.to_string(), payload.to_string()));

        let mut subscribers = self.subscribers.lock().await;
        if let Some(channels) = subscribers.get_mut(topic) {
            let mut open = Vec::new();
            for tx in channels.drain(..) {
                if tx.send(payload.to_string()).await.is_ok() {
                    open.push(tx);
                }
            }
            *channels = open;
        }
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> AppResult<mpsc::Receiver<String>> {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        self.subscribers
            .lock()
            .await
            .entry(topic.to_string())
            .or_default()
            .push(tx);
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_to_subscribers_and_logs() {
        let bus = MemoryBus::new();
        let mut rx = bus.subscribe("orders.topic").await.unwrap();

        bus.publish("orders.topic", r#"{"orderId":"x"}"#)
            .await
            .unwrap();
        bus.publish("events.lifecycle", r#"{"type":"CREATED"}"#)
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap(), r#"{"orderId":"x"}"#);
        assert_eq!(bus.published("orders.topic").await.len(), 1);
        assert_eq!(bus.published("events.lifecycle").await.len(), 1);
    }
}
