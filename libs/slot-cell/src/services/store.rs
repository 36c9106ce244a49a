use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{NewSlot, Slot, SlotError, SlotState};

/// Authoritative store for slot state. Every mutator is a single conditional
/// transition keyed on the slot's current state, so concurrent callers are
/// linearized by the store itself and never race a read against a write.
///
/// Mutators are idempotent-safe: a transition whose precondition no longer
/// holds reports `Ok(false)` without touching the record.
#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn create_slot(&self, new_slot: NewSlot) -> Result<Slot, SlotError>;

    /// `Active -> Reserved`, stamping `reserved_by`/`reserved_at`. The one
    /// primitive that prevents double-booking: exactly one claim can observe
    /// `Active`.
    async fn try_claim(
        &self,
        slot_id: Uuid,
        reservation_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, SlotError>;

    /// `Reserved(reservation_id) -> Booked`. `ReservationMismatch` when the
    /// slot is held by a different reservation.
    async fn confirm(&self, slot_id: Uuid, reservation_id: Uuid) -> Result<bool, SlotError>;

    /// `Reserved(reservation_id) -> Active`, clearing the reservation stamps.
    async fn release(&self, slot_id: Uuid, reservation_id: Uuid) -> Result<bool, SlotError>;

    /// `Booked -> Cancelled`. The slot does not return to `Active`; a
    /// booked-then-cancelled slot needs explicit provider action to reopen.
    async fn cancel_booked(&self, slot_id: Uuid) -> Result<bool, SlotError>;

    /// `Active -> Cancelled`. Provider pulls an unbooked slot off the calendar.
    async fn withdraw(&self, slot_id: Uuid) -> Result<bool, SlotError>;

    async fn list_active(
        &self,
        provider_id: Uuid,
        from_date: NaiveDate,
    ) -> Result<Vec<Slot>, SlotError>;

    async fn get(&self, slot_id: Uuid) -> Result<Option<Slot>, SlotError>;
}

/// In-process `SlotStore`. All transitions happen under one write guard,
/// which is the compare-and-swap any replacement backend must also provide.
pub struct MemorySlotStore {
    slots: RwLock<HashMap<Uuid, Slot>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemorySlotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SlotStore for MemorySlotStore {
    async fn create_slot(&self, new_slot: NewSlot) -> Result<Slot, SlotError> {
        let mut slots = self.slots.write().await;

        // Cancelled slots do not hold the calendar position: the provider may
        // re-create a slot they previously withdrew or cancelled.
        let occupied = slots.values().any(|slot| {
            slot.provider_id == new_slot.provider_id
                && slot.date == new_slot.date
                && slot.time == new_slot.time
                && slot.state != SlotState::Cancelled
        });
        if occupied {
            return Err(SlotError::DuplicateSlot);
        }

        let now = Utc::now();
        let slot = Slot {
            id: Uuid::new_v4(),
            provider_id: new_slot.provider_id,
            date: new_slot.date,
            time: new_slot.time,
            duration_minutes: new_slot.duration_minutes,
            state: SlotState::Active,
            reserved_by: None,
            reserved_at: None,
            description: new_slot.description,
            created_at: now,
            updated_at: now,
        };

        debug!("Created slot {} for provider {} at {} {}",
               slot.id, slot.provider_id, slot.date, slot.time);

        slots.insert(slot.id, slot.clone());
        Ok(slot)
    }

    async fn try_claim(
        &self,
        slot_id: Uuid,
        reservation_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, SlotError> {
        let mut slots = self.slots.write().await;
        let slot = slots.get_mut(&slot_id).ok_or(SlotError::SlotNotFound)?;

        if slot.state != SlotState::Active {
            debug!("Claim on slot {} rejected: state is {}", slot_id, slot.state);
            return Ok(false);
        }

        slot.state = SlotState::Reserved;
        slot.reserved_by = Some(reservation_id);
        slot.reserved_at = Some(at);
        slot.updated_at = Utc::now();
        debug!("Slot {} reserved by {}", slot_id, reservation_id);
        Ok(true)
    }

    async fn confirm(&self, slot_id: Uuid, reservation_id: Uuid) -> Result<bool, SlotError> {
        let mut slots = self.slots.write().await;
        let slot = slots.get_mut(&slot_id).ok_or(SlotError::SlotNotFound)?;

        match (slot.state, slot.reserved_by) {
            (SlotState::Reserved, Some(holder)) if holder == reservation_id => {
                slot.state = SlotState::Booked;
                slot.reserved_by = None;
                slot.reserved_at = None;
                slot.updated_at = Utc::now();
                debug!("Slot {} booked via reservation {}", slot_id, reservation_id);
                Ok(true)
            }
            (SlotState::Reserved, _) => Err(SlotError::ReservationMismatch),
            _ => Ok(false),
        }
    }

    async fn release(&self, slot_id: Uuid, reservation_id: Uuid) -> Result<bool, SlotError> {
        let mut slots = self.slots.write().await;
        let slot = slots.get_mut(&slot_id).ok_or(SlotError::SlotNotFound)?;

        match (slot.state, slot.reserved_by) {
            (SlotState::Reserved, Some(holder)) if holder == reservation_id => {
                slot.state = SlotState::Active;
                slot.reserved_by = None;
                slot.reserved_at = None;
                slot.updated_at = Utc::now();
                debug!("Slot {} released by reservation {}", slot_id, reservation_id);
                Ok(true)
            }
            // Already released, or re-claimed by a later reservation. Either
            // way the caller's hold is gone and there is nothing to undo.
            _ => Ok(false),
        }
    }

    async fn cancel_booked(&self, slot_id: Uuid) -> Result<bool, SlotError> {
        let mut slots = self.slots.write().await;
        let slot = slots.get_mut(&slot_id).ok_or(SlotError::SlotNotFound)?;

        if slot.state != SlotState::Booked {
            return Ok(false);
        }

        slot.state = SlotState::Cancelled;
        slot.updated_at = Utc::now();
        debug!("Booked slot {} cancelled", slot_id);
        Ok(true)
    }

    async fn withdraw(&self, slot_id: Uuid) -> Result<bool, SlotError> {
        let mut slots = self.slots.write().await;
        let slot = slots.get_mut(&slot_id).ok_or(SlotError::SlotNotFound)?;

        if slot.state != SlotState::Active {
            return Ok(false);
        }

        slot.state = SlotState::Cancelled;
        slot.updated_at = Utc::now();
        debug!("Slot {} withdrawn by provider", slot_id);
        Ok(true)
    }

    async fn list_active(
        &self,
        provider_id: Uuid,
        from_date: NaiveDate,
    ) -> Result<Vec<Slot>, SlotError> {
        let slots = self.slots.read().await;
        let mut active: Vec<Slot> = slots
            .values()
            .filter(|slot| {
                slot.provider_id == provider_id
                    && slot.state == SlotState::Active
                    && slot.date >= from_date
            })
            .cloned()
            .collect();
        active.sort_by_key(|slot| (slot.date, slot.time));
        Ok(active)
    }

    async fn get(&self, slot_id: Uuid) -> Result<Option<Slot>, SlotError> {
        let slots = self.slots.read().await;
        Ok(slots.get(&slot_id).cloned())
    }
}
