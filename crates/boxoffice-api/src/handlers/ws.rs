//! Queue-position WebSocket.
//!
//! Pushes the caller's queue position on a fixed interval and a terminal
//! `PROMOTED` message once the promoter admits them, then closes.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use boxoffice_queue::{ErrorMessage, PositionMessage, PromotedMessage, QueueStatus};

use crate::dto::request::QueueEntryQuery;
use crate::state::AppState;

/// GET /ws/queue?eventId={id}&userId={id} (WebSocket upgrade)
pub async fn queue_ws(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<QueueEntryQuery>,
) -> Response {
    ws.on_upgrade(move |socket| stream_positions(state, query, socket))
}

/// Drives one waiting-room connection until promotion or disconnect.
async fn stream_positions(state: AppState, query: QueueEntryQuery, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let event_id = query.event_id;
    let user_id = query.user_id;

    info!(event_id, user_id, "Waiting-room socket opened");

    if let Err(e) = state.waiting_room.join(event_id, &user_id).await {
        warn!(event_id, user_id, error = %e, "Could not join waiting queue");
        let _ = send_json(
            &mut ws_tx,
            &ErrorMessage {
                error: "Could not join the waiting queue".to_string(),
            },
        )
        .await;
        return;
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(
        state.config.queue.position_interval_seconds,
    ));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match state.waiting_room.status(event_id, &user_id).await {
                    Ok(QueueStatus::Promoted) => {
                        let _ = send_json(&mut ws_tx, &PromotedMessage::for_user(&user_id)).await;
                        break;
                    }
                    Ok(QueueStatus::Waiting { position }) => {
                        let message = PositionMessage {
                            position,
                            user_id: user_id.clone(),
                        };
                        if send_json(&mut ws_tx, &message).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(event_id, user_id, error = %e, "Position poll failed");
                        let _ = send_json(
                            &mut ws_tx,
                            &ErrorMessage {
                                error: "Queue position unavailable".to_string(),
                            },
                        )
                        .await;
                        break;
                    }
                }
            }
            inbound = ws_rx.next() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(event_id, user_id, "Client closed waiting-room socket");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(event_id, user_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
        }
    }

    let _ = ws_tx.close().await;
    info!(event_id, user_id, "Waiting-room socket closed");
}

/// Serialize and send one message.
async fn send_json<T: serde::Serialize>(
    ws_tx: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
    message: &T,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message)
        .map_err(|e| axum::Error::new(std::io::Error::other(e.to_string())))?;
    ws_tx.send(Message::Text(json.into())).await
}
