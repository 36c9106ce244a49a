use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{BookingError, Reservation, ReservationStatus};

/// Record store for reservations, with the same discipline as the slot
/// store: the only mutation primitive is a conditional transition keyed on
/// the current status, so a confirm racing an expiry settles the record
/// exactly once.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn insert(&self, reservation: Reservation) -> Result<(), BookingError>;

    async fn get(&self, reservation_id: Uuid) -> Result<Option<Reservation>, BookingError>;

    /// Atomically move `from -> to`; `Ok(false)` without mutation when the
    /// record is not currently in `from`.
    async fn transition(
        &self,
        reservation_id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> Result<bool, BookingError>;

    /// Pending reservations with `created_at <= cutoff`. The boundary instant
    /// is included: a hold exactly as old as the window belongs to the scanner.
    async fn list_pending_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, BookingError>;
}

pub struct MemoryReservationStore {
    reservations: RwLock<HashMap<Uuid, Reservation>>,
}

impl MemoryReservationStore {
    pub fn new() -> Self {
        Self {
            reservations: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryReservationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn insert(&self, reservation: Reservation) -> Result<(), BookingError> {
        let mut reservations = self.reservations.write().await;
        reservations.insert(reservation.id, reservation);
        Ok(())
    }

    async fn get(&self, reservation_id: Uuid) -> Result<Option<Reservation>, BookingError> {
        let reservations = self.reservations.read().await;
        Ok(reservations.get(&reservation_id).cloned())
    }

    async fn transition(
        &self,
        reservation_id: Uuid,
        from: ReservationStatus,
        to: ReservationStatus,
    ) -> Result<bool, BookingError> {
        let mut reservations = self.reservations.write().await;
        match reservations.get_mut(&reservation_id) {
            Some(reservation) if reservation.status == from => {
                reservation.status = to;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(BookingError::ReservationNotFound),
        }
    }

    async fn list_pending_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, BookingError> {
        let reservations = self.reservations.read().await;
        let mut due: Vec<Reservation> = reservations
            .values()
            .filter(|r| r.status == ReservationStatus::Pending && r.created_at <= cutoff)
            .cloned()
            .collect();
        due.sort_by_key(|r| r.created_at);
        Ok(due)
    }
}
