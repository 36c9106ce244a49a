use axum::{routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;

use booking_cell::router::{booking_routes, BookingCellState};
use slot_cell::router::{slot_routes, SlotCellState};

pub fn create_router(
    slot_state: Arc<SlotCellState>,
    booking_state: Arc<BookingCellState>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Carebook API is running!" }))
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .nest("/api/slots", slot_routes(slot_state))
        .nest("/api/bookings", booking_routes(booking_state))
}
