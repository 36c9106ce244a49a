// libs/booking-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_models::error::AppError;
use slot_cell::models::SlotError;

use crate::models::{BookingError, CancelReservationRequest, ReserveRequest};
use crate::router::BookingCellState;
use crate::services::refunds::RefundSink;

/// Place a hold on a slot. The hold must be paid within the configured
/// window or the expiry sweep gives the slot back.
#[axum::debug_handler]
pub async fn reserve_slot(
    State(state): State<Arc<BookingCellState>>,
    Json(request): Json<ReserveRequest>,
) -> Result<Json<Value>, AppError> {
    let reservation = state
        .coordinator
        .reserve(request.slot_id, request.holder_id)
        .await
        .map_err(|e| match e {
            BookingError::SlotUnavailable => AppError::Conflict(
                "This time is no longer available, please pick another slot".to_string(),
            ),
            BookingError::Slot(SlotError::SlotNotFound) => {
                AppError::NotFound("Slot not found".to_string())
            }
            _ => AppError::Internal(e.to_string()),
        })?;

    let hold_expires_at = reservation.created_at + state.coordinator.hold_window();

    Ok(Json(json!({
        "success": true,
        "reservation": reservation,
        "hold_expires_at": hold_expires_at
    })))
}

/// Record the outcome of an external payment. A payment that raced the
/// expiry sweep and lost triggers the refund sink before the error is
/// surfaced, so the caller's money is compensated rather than dropped.
#[axum::debug_handler]
pub async fn confirm_payment(
    State(state): State<Arc<BookingCellState>>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    match state.coordinator.confirm_payment(reservation_id).await {
        Ok(reservation) => Ok(Json(json!({
            "success": true,
            "reservation": reservation
        }))),
        Err(BookingError::PaymentRaceLost) => {
            if let Ok(reservation) = state.coordinator.get_reservation(reservation_id).await {
                state.refunds.trigger_refund(&reservation).await;
            }
            Err(AppError::Conflict(
                "Your payment could not be completed and a refund has been initiated; please contact support".to_string(),
            ))
        }
        Err(BookingError::ReservationNotFound) => {
            Err(AppError::NotFound("Reservation not found".to_string()))
        }
        Err(BookingError::ReservationNotPending(status)) => Err(AppError::Conflict(format!(
            "Reservation is already {}",
            status
        ))),
        Err(e) => Err(AppError::Internal(e.to_string())),
    }
}

#[axum::debug_handler]
pub async fn cancel_reservation(
    State(state): State<Arc<BookingCellState>>,
    Path(reservation_id): Path<Uuid>,
    Json(request): Json<CancelReservationRequest>,
) -> Result<Json<Value>, AppError> {
    if let Some(reason) = &request.reason {
        info!("Cancellation reason for {}: {}", reservation_id, reason);
    }

    let reservation = state
        .coordinator
        .cancel(reservation_id, request.cancelled_by)
        .await
        .map_err(|e| match e {
            BookingError::ReservationNotFound => {
                AppError::NotFound("Reservation not found".to_string())
            }
            BookingError::SlotStateMismatch => AppError::Internal(
                "Reservation and slot state disagree; contact support".to_string(),
            ),
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "reservation": reservation
    })))
}

#[axum::debug_handler]
pub async fn get_reservation(
    State(state): State<Arc<BookingCellState>>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let reservation = state
        .coordinator
        .get_reservation(reservation_id)
        .await
        .map_err(|e| match e {
            BookingError::ReservationNotFound => {
                AppError::NotFound("Reservation not found".to_string())
            }
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "reservation": reservation
    })))
}
