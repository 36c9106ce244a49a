// libs/slot-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{CreateSlotRequest, NewSlot, SlotError, SlotListQuery};
use crate::router::SlotCellState;
use crate::services::store::SlotStore;

/// Provider publishes a bookable time-window.
#[axum::debug_handler]
pub async fn create_slot(
    State(state): State<Arc<SlotCellState>>,
    Json(request): Json<CreateSlotRequest>,
) -> Result<Json<Value>, AppError> {
    let duration_minutes = request
        .duration_minutes
        .unwrap_or(state.config.default_slot_duration_minutes);

    if duration_minutes <= 0 {
        return Err(AppError::ValidationError(
            "duration_minutes must be positive".to_string(),
        ));
    }

    let slot = state
        .store
        .create_slot(NewSlot {
            provider_id: request.provider_id,
            date: request.date,
            time: request.time,
            duration_minutes,
            description: request.description,
        })
        .await
        .map_err(|e| match e {
            SlotError::DuplicateSlot => {
                AppError::Conflict("A slot already exists at this date and time".to_string())
            }
            _ => AppError::Internal(e.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "slot": slot
    })))
}

/// List a provider's open slots from a given date (default: today).
#[axum::debug_handler]
pub async fn list_active_slots(
    State(state): State<Arc<SlotCellState>>,
    Query(query): Query<SlotListQuery>,
) -> Result<Json<Value>, AppError> {
    let from_date = query.from_date.unwrap_or_else(|| Utc::now().date_naive());

    let slots = state
        .store
        .list_active(query.provider_id, from_date)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "slots": slots
    })))
}

#[axum::debug_handler]
pub async fn get_slot(
    State(state): State<Arc<SlotCellState>>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let slot = state
        .store
        .get(slot_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Slot not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "slot": slot
    })))
}

/// Provider pulls an unbooked slot off the calendar.
#[axum::debug_handler]
pub async fn withdraw_slot(
    State(state): State<Arc<SlotCellState>>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let withdrawn = state.store.withdraw(slot_id).await.map_err(|e| match e {
        SlotError::SlotNotFound => AppError::NotFound("Slot not found".to_string()),
        _ => AppError::Internal(e.to_string()),
    })?;

    if !withdrawn {
        return Err(AppError::Conflict(
            "Slot is reserved or booked and cannot be withdrawn".to_string(),
        ));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Slot withdrawn"
    })))
}
