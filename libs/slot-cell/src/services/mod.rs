pub mod store;

pub use store::{MemorySlotStore, SlotStore};
