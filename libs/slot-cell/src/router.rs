// libs/slot-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;
use crate::services::store::SlotStore;

pub struct SlotCellState {
    pub store: Arc<dyn SlotStore>,
    pub config: Arc<AppConfig>,
}

pub fn slot_routes(state: Arc<SlotCellState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_slot).get(handlers::list_active_slots))
        .route("/{slot_id}", get(handlers::get_slot))
        .route("/{slot_id}/withdraw", post(handlers::withdraw_slot))
        .with_state(state)
}
