pub mod models;
pub mod handlers;
pub mod router;
pub mod services;

pub use models::*;
pub use router::{booking_routes, BookingCellState};
pub use services::clock::{Clock, ManualClock, SystemClock};
pub use services::coordinator::ReservationCoordinator;
pub use services::expiry::{ExpiryScanner, SweepOutcome};
pub use services::refunds::{LoggingRefundSink, RefundSink};
pub use services::store::{MemoryReservationStore, ReservationStore};
