// libs/booking-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::services::coordinator::ReservationCoordinator;
use crate::services::refunds::RefundSink;

pub struct BookingCellState {
    pub coordinator: Arc<ReservationCoordinator>,
    pub refunds: Arc<dyn RefundSink>,
}

pub fn booking_routes(state: Arc<BookingCellState>) -> Router {
    Router::new()
        .route("/", post(handlers::reserve_slot))
        .route("/{reservation_id}", get(handlers::get_reservation))
        .route("/{reservation_id}/confirm", post(handlers::confirm_payment))
        .route("/{reservation_id}/cancel", post(handlers::cancel_reservation))
        .with_state(state)
}
