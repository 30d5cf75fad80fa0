//! Booking handlers: reserve, confirm, lookup.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use boxoffice_booking::Reservation;
use boxoffice_core::error::AppError;

use crate::dto::response::{ApiResponse, OrderResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/bookings
pub async fn reserve(
    State(state): State<AppState>,
    Json(req): Json<crate::dto::request::ReserveRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Reservation>>), ApiError> {
    let reservation = state
        .coordinator
        .reserve(req.user_id, req.event_id, &req.seat_ids)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(reservation))))
}

/// POST /api/bookings/{id}/confirm
pub async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order = state.confirmation.confirm(id).await?;
    Ok(Json(ApiResponse::ok(order.into())))
}

/// GET /api/bookings/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order = state
        .orders
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;

    Ok(Json(ApiResponse::ok(order.into())))
}
