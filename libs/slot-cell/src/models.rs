// libs/slot-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// CORE SLOT MODELS
// ==============================================================================

/// A bookable provider time-window. Identity is `(provider_id, date, time)`:
/// at most one non-cancelled slot may occupy that tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub state: SlotState,
    pub reserved_by: Option<Uuid>,
    pub reserved_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Slot {
    pub fn start_datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Scheduled end based on start and duration.
    pub fn end_datetime(&self) -> NaiveDateTime {
        self.start_datetime() + chrono::Duration::minutes(self.duration_minutes as i64)
    }

    pub fn is_bookable(&self) -> bool {
        self.state == SlotState::Active
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Active,
    Reserved,
    Booked,
    Cancelled,
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotState::Active => write!(f, "active"),
            SlotState::Reserved => write!(f, "reserved"),
            SlotState::Booked => write!(f, "booked"),
            SlotState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Input for slot creation; the store assigns id, state and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSlot {
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub description: Option<String>,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSlotRequest {
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: Option<i32>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlotListQuery {
    pub provider_id: Uuid,
    pub from_date: Option<NaiveDate>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum SlotError {
    #[error("A slot already exists for this provider, date and time")]
    DuplicateSlot,

    #[error("Slot not found")]
    SlotNotFound,

    #[error("Slot is held by a different reservation")]
    ReservationMismatch,
}
