//! Redis pub/sub event bus for multi-node deployments.

use async_trait::async_trait;
use futures::StreamExt;
use redis::Client;
use redis::aio::ConnectionManager;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use boxoffice_core::error::{AppError, ErrorKind};
use boxoffice_core::result::AppResult;
use boxoffice_core::traits::EventBus;

/// Channel capacity per subscription.
const SUBSCRIPTION_CAPACITY: usize = 256;

/// Redis-backed [`EventBus`].
#[derive(Debug, Clone)]
pub struct RedisEventBus {
    /// Shared connection for publishing.
    conn: ConnectionManager,
    /// Connection URL, kept for dedicated subscriber connections.
    url: String,
}

impl RedisEventBus {
    /// Connect a new event bus.
    pub async fn connect(url: &str) -> AppResult<Self> {
        let client = Client::open(url).map_err(|e| {
            AppError::with_source(ErrorKind::Bus, "Failed to create Redis client for bus", e)
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(ErrorKind::Bus, "Failed to connect event bus to Redis", e)
        })?;

        Ok(Self {
            conn,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl EventBus for RedisEventBus {
    async fn publish(&self, topic: &str, payload: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PUBLISH")
            .arg(topic)
            .arg(payload)
            .query_async::<i64>(&mut conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Bus, format!("PUBLISH to '{topic}' failed"), e)
            })?;
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> AppResult<mpsc::Receiver<String>> {
        // Pub/sub puts a connection into subscriber mode, so each
        // subscription gets its own connection.
        let client = Client::open(self.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Bus, "Failed to create subscriber client", e)
        })?;

        let mut pubsub = client.get_async_pubsub().await.map_err(|e| {
            AppError::with_source(ErrorKind::Bus, "Failed to open subscriber connection", e)
        })?;

        pubsub.subscribe(topic).await.map_err(|e| {
            AppError::with_source(ErrorKind::Bus, format!("SUBSCRIBE to '{topic}' failed"), e)
        })?;

        info!(topic, "Subscribed to event bus topic");

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        let topic = topic.to_string();

        tokio::spawn(async move {
            let mut stream = pubsub.into_on_message();
            while let Some(msg) = stream.next().await {
                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(topic, error = %e, "Ignoring unreadable bus message");
                        continue;
                    }
                };
                if tx.send(payload).await.is_err() {
                    info!(topic, "Subscriber dropped, stopping relay");
                    return;
                }
            }
            error!(topic, "Event bus subscription stream ended");
        });

        Ok(rx)
    }
}
