pub mod clock;
pub mod coordinator;
pub mod expiry;
pub mod refunds;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::ReservationCoordinator;
pub use expiry::{ExpiryScanner, SweepOutcome};
pub use refunds::{LoggingRefundSink, RefundSink};
pub use store::{MemoryReservationStore, ReservationStore};
