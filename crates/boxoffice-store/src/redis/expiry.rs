//! Keyspace-expiry notification listener.
//!
//! Redis publishes `__keyevent@<db>__:expired` messages when keys with a
//! TTL lapse. The listener forwards expired key names (with the configured
//! prefix stripped) to an mpsc channel consumed by the expiry compensator.

use futures::StreamExt;
use redis::Client;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use boxoffice_core::error::{AppError, ErrorKind};
use boxoffice_core::result::AppResult;

use super::client::RedisClient;

/// Channel capacity for expired-key notifications.
const EXPIRY_CHANNEL_CAPACITY: usize = 256;

/// Pattern matching expiry events on any database.
const EXPIRED_EVENT_PATTERN: &str = "__keyevent@*__:expired";

/// Subscribe to keyspace-expiry notifications on a dedicated connection.
///
/// Pub/sub puts a connection into subscriber mode, so the shared
/// connection manager cannot be reused here. Notifications are
/// fire-and-forget on the Redis side; a consumer that falls behind loses
/// events, which is why callers must treat delivery as at-least-once from
/// their own retry path, never exactly-once.
pub async fn spawn_expiry_listener(client: &RedisClient) -> AppResult<mpsc::Receiver<String>> {
    let raw = Client::open(client.url()).map_err(|e| {
        AppError::with_source(
            ErrorKind::Coordination,
            "Failed to create Redis client for expiry listener",
            e,
        )
    })?;

    enable_expiry_notifications(client).await;

    let mut pubsub = raw.get_async_pubsub().await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Coordination,
            "Failed to open Redis pub/sub connection",
            e,
        )
    })?;

    pubsub.psubscribe(EXPIRED_EVENT_PATTERN).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Coordination,
            "Failed to subscribe to keyspace expiry events",
            e,
        )
    })?;

    info!(pattern = EXPIRED_EVENT_PATTERN, "Listening for key expiry events");

    let (tx, rx) = mpsc::channel(EXPIRY_CHANNEL_CAPACITY);
    let prefix = client.prefix().to_string();

    tokio::spawn(async move {
        let mut stream = pubsub.into_on_message();
        while let Some(msg) = stream.next().await {
            let payload: String = match msg.get_payload() {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable expiry notification");
                    continue;
                }
            };

            let Some(key) = payload.strip_prefix(&prefix) else {
                debug!(key = %payload, "Expired key outside configured prefix");
                continue;
            };

            if tx.send(key.to_string()).await.is_err() {
                info!("Expiry consumer dropped, stopping listener");
                break;
            }
        }
        error!("Redis expiry notification stream ended");
    });

    Ok(rx)
}

/// Enable keyspace expiry events on the server.
///
/// Best effort: managed Redis offerings often forbid CONFIG SET and expect
/// the flag to be set at the instance level instead.
async fn enable_expiry_notifications(client: &RedisClient) {
    let mut conn = client.conn_mut();
    let result: Result<(), redis::RedisError> = redis::cmd("CONFIG")
        .arg("SET")
        .arg("notify-keyspace-events")
        .arg("Ex")
        .query_async(&mut conn)
        .await;

    if let Err(e) = result {
        warn!(
            error = %e,
            "Could not enable notify-keyspace-events; expiry events require it to be set server-side"
        );
    }
}
