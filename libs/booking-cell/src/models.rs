// libs/booking-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use slot_cell::models::SlotError;

// ==============================================================================
// CORE RESERVATION MODELS
// ==============================================================================

/// A time-bounded hold on a slot pending payment. Created by
/// `ReservationCoordinator::reserve` and mutated only through the
/// coordinator's operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub holder_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Paid,
    Expired,
    Cancelled,
}

impl ReservationStatus {
    /// `Paid`, `Expired` and `Cancelled` are terminal; no transition leaves them.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReservationStatus::Pending)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "pending"),
            ReservationStatus::Paid => write!(f, "paid"),
            ReservationStatus::Expired => write!(f, "expired"),
            ReservationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Who asked for the cancellation; recorded in logs so user-initiated
/// cancellations can be told apart from timeouts and operator action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CancelActor {
    Holder,
    Provider,
    System,
}

impl fmt::Display for CancelActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelActor::Holder => write!(f, "holder"),
            CancelActor::Provider => write!(f, "provider"),
            CancelActor::System => write!(f, "system"),
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ReserveRequest {
    pub slot_id: Uuid,
    pub holder_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelReservationRequest {
    pub cancelled_by: CancelActor,
    pub reason: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum BookingError {
    #[error("Slot is not available for reservation")]
    SlotUnavailable,

    #[error("Reservation not found")]
    ReservationNotFound,

    #[error("Reservation is not pending (status: {0})")]
    ReservationNotPending(ReservationStatus),

    #[error("Reservation and slot state disagree")]
    SlotStateMismatch,

    #[error("Payment arrived after the reservation hold was reclaimed")]
    PaymentRaceLost,

    #[error("Slot error: {0}")]
    Slot(#[from] SlotError),

    #[error("Store error: {0}")]
    Store(String),
}
