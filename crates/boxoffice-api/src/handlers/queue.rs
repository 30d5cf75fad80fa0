//! Waiting-room handlers: queue-token minting and the waiting-room page.

use axum::Json;
use axum::extract::{Query, State};

use boxoffice_queue::QueueStatus;

use crate::dto::request::{QueueEntryQuery, QueueTokenRequest};
use crate::dto::response::{ApiResponse, QueueStatusResponse, QueueTokenResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/v1/auth/queue-token
///
/// Mints an admission token; 403 unless the promoter has already moved
/// the user into the event's active set.
pub async fn queue_token(
    State(state): State<AppState>,
    Json(req): Json<QueueTokenRequest>,
) -> Result<Json<ApiResponse<QueueTokenResponse>>, ApiError> {
    let token = state.admission.mint(req.event_id, &req.user_id).await?;
    Ok(Json(ApiResponse::ok(QueueTokenResponse { token })))
}

/// GET /queue/waiting-room?eventId={id}&userId={id}
///
/// Joins (or re-joins) the queue and reports the current standing. This
/// is also the redirect target of the admission gate.
pub async fn waiting_room(
    State(state): State<AppState>,
    Query(query): Query<QueueEntryQuery>,
) -> Result<Json<ApiResponse<QueueStatusResponse>>, ApiError> {
    state
        .waiting_room
        .join(query.event_id, &query.user_id)
        .await?;

    let status = state
        .waiting_room
        .status(query.event_id, &query.user_id)
        .await?;

    let response = match status {
        QueueStatus::Promoted => QueueStatusResponse {
            status: "PROMOTED".to_string(),
            position: None,
        },
        QueueStatus::Waiting { position } => QueueStatusResponse {
            status: "WAITING".to_string(),
            position: Some(position),
        },
    };

    Ok(Json(ApiResponse::ok(response)))
}
