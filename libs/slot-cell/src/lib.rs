pub mod models;
pub mod handlers;
pub mod router;
pub mod services;

pub use models::*;
pub use router::{slot_routes, SlotCellState};
pub use services::store::{MemorySlotStore, SlotStore};
