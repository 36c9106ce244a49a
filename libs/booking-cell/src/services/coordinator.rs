// libs/booking-cell/src/services/coordinator.rs
use chrono::Duration;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use slot_cell::models::SlotError;
use slot_cell::services::store::SlotStore;

use crate::models::{BookingError, CancelActor, Reservation, ReservationStatus};
use crate::services::clock::Clock;
use crate::services::store::ReservationStore;

/// The booking state machine layered on the slot store.
///
/// Two conditional transitions decide every race. The slot store's claim is
/// the linearization point for `reserve`: exactly one caller can move a slot
/// out of `Active`. The reservation record's status transition is the
/// linearization point for settlement: exactly one of confirm, cancel or
/// expiry moves the record out of `Pending`, and only that winner touches
/// the slot afterwards. The coordinator keeps no slot state between calls;
/// the stores are the only truth.
pub struct ReservationCoordinator {
    slots: Arc<dyn SlotStore>,
    reservations: Arc<dyn ReservationStore>,
    clock: Arc<dyn Clock>,
    hold_window: Duration,
}

impl ReservationCoordinator {
    pub fn new(
        slots: Arc<dyn SlotStore>,
        reservations: Arc<dyn ReservationStore>,
        clock: Arc<dyn Clock>,
        hold_window_minutes: i64,
    ) -> Self {
        Self {
            slots,
            reservations,
            clock,
            hold_window: Duration::minutes(hold_window_minutes),
        }
    }

    pub fn hold_window(&self) -> Duration {
        self.hold_window
    }

    /// Place a hold on a slot. Exactly one reserve call can win a slot
    /// between two releases; losers get `SlotUnavailable` and must pick
    /// another slot, never retry the same claim.
    #[instrument(skip(self))]
    pub async fn reserve(
        &self,
        slot_id: Uuid,
        holder_id: Uuid,
    ) -> Result<Reservation, BookingError> {
        let reservation_id = Uuid::new_v4();
        let now = self.clock.now();

        if !self.slots.try_claim(slot_id, reservation_id, now).await? {
            info!("Slot {} unavailable for holder {}", slot_id, holder_id);
            return Err(BookingError::SlotUnavailable);
        }

        let reservation = Reservation {
            id: reservation_id,
            slot_id,
            holder_id,
            created_at: now,
            status: ReservationStatus::Pending,
        };

        if let Err(e) = self.reservations.insert(reservation.clone()).await {
            // A claim without a record could never be expired; give the slot back.
            if let Err(release_err) = self.slots.release(slot_id, reservation_id).await {
                warn!("Failed to release slot {} after insert failure: {}", slot_id, release_err);
            }
            return Err(e);
        }

        info!("Reservation {} holds slot {} for holder {}", reservation_id, slot_id, holder_id);
        Ok(reservation)
    }

    /// Record a successful payment. A payment that arrives after the hold
    /// was reclaimed gets `PaymentRaceLost`; the caller must trigger a
    /// refund. That is the compensation contract, not optional logging.
    #[instrument(skip(self))]
    pub async fn confirm_payment(
        &self,
        reservation_id: Uuid,
    ) -> Result<Reservation, BookingError> {
        let reservation = self
            .reservations
            .get(reservation_id)
            .await?
            .ok_or(BookingError::ReservationNotFound)?;

        match reservation.status {
            ReservationStatus::Pending => {}
            ReservationStatus::Expired => return Err(BookingError::PaymentRaceLost),
            status => return Err(BookingError::ReservationNotPending(status)),
        }

        let settled = self
            .reservations
            .transition(reservation_id, ReservationStatus::Pending, ReservationStatus::Paid)
            .await?;
        if !settled {
            // Someone else settled the record while the payment was in flight.
            let current = self
                .reservations
                .get(reservation_id)
                .await?
                .ok_or(BookingError::ReservationNotFound)?;
            return match current.status {
                ReservationStatus::Expired => Err(BookingError::PaymentRaceLost),
                status => Err(BookingError::ReservationNotPending(status)),
            };
        }

        // Winning the record settle means the hold is still ours, so the
        // slot must still be reserved by this reservation.
        match self.slots.confirm(reservation.slot_id, reservation_id).await {
            Ok(true) => {
                info!("Reservation {} paid, slot {} booked", reservation_id, reservation.slot_id);
                Ok(Reservation {
                    status: ReservationStatus::Paid,
                    ..reservation
                })
            }
            Ok(false) | Err(SlotError::ReservationMismatch) => {
                // The books disagree; fail the payment so it is refunded
                // rather than leaving a paid record on an unbooked slot.
                if !self
                    .reservations
                    .transition(reservation_id, ReservationStatus::Paid, ReservationStatus::Expired)
                    .await?
                {
                    warn!("Could not roll back reservation {} after slot mismatch", reservation_id);
                }
                warn!("Slot {} was not held by reservation {} at confirm",
                      reservation.slot_id, reservation_id);
                Err(BookingError::PaymentRaceLost)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Cancel a reservation. A pending hold releases its slot back to the
    /// calendar; a paid booking marks the slot cancelled without reopening
    /// it. Funds are untouched: refunds for paid cancellations are an
    /// external policy decision. Cancelling an already-terminal reservation
    /// is a no-op that returns the settled record.
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        reservation_id: Uuid,
        actor: CancelActor,
    ) -> Result<Reservation, BookingError> {
        let reservation = self
            .reservations
            .get(reservation_id)
            .await?
            .ok_or(BookingError::ReservationNotFound)?;

        match reservation.status {
            ReservationStatus::Pending => {
                let settled = self
                    .reservations
                    .transition(
                        reservation_id,
                        ReservationStatus::Pending,
                        ReservationStatus::Cancelled,
                    )
                    .await?;
                if !settled {
                    // The expiry sweep or a racing confirm settled it first.
                    let current = self.reservations.get(reservation_id).await?;
                    return Ok(current.unwrap_or(reservation));
                }

                if !self
                    .slots
                    .release(reservation.slot_id, reservation_id)
                    .await?
                {
                    warn!("Slot {} was already released when reservation {} cancelled",
                          reservation.slot_id, reservation_id);
                }

                info!("Reservation {} cancelled by {}", reservation_id, actor);
                Ok(Reservation {
                    status: ReservationStatus::Cancelled,
                    ..reservation
                })
            }
            ReservationStatus::Paid => {
                let settled = self
                    .reservations
                    .transition(
                        reservation_id,
                        ReservationStatus::Paid,
                        ReservationStatus::Cancelled,
                    )
                    .await?;
                if !settled {
                    let current = self.reservations.get(reservation_id).await?;
                    return Ok(current.unwrap_or(reservation));
                }

                if !self.slots.cancel_booked(reservation.slot_id).await? {
                    return Err(BookingError::SlotStateMismatch);
                }

                info!("Paid reservation {} cancelled by {}", reservation_id, actor);
                Ok(Reservation {
                    status: ReservationStatus::Cancelled,
                    ..reservation
                })
            }
            // Terminal: repeat cancels are no-ops, not errors.
            ReservationStatus::Expired | ReservationStatus::Cancelled => Ok(reservation),
        }
    }

    /// Reclaim a pending hold whose window has passed. Same effect as a
    /// cancel of a pending reservation; invoked only by the expiry scanner
    /// and logged as a timeout so operators can tell the two apart.
    #[instrument(skip(self))]
    pub async fn expire(&self, reservation_id: Uuid) -> Result<Reservation, BookingError> {
        let reservation = self
            .reservations
            .get(reservation_id)
            .await?
            .ok_or(BookingError::ReservationNotFound)?;

        if reservation.status != ReservationStatus::Pending {
            return Ok(reservation);
        }

        let settled = self
            .reservations
            .transition(
                reservation_id,
                ReservationStatus::Pending,
                ReservationStatus::Expired,
            )
            .await?;
        if !settled {
            // A confirm or cancel settled the record between the sweep's
            // listing and this call; the winner owns the slot.
            let current = self.reservations.get(reservation_id).await?;
            return Ok(current.unwrap_or(reservation));
        }

        if !self
            .slots
            .release(reservation.slot_id, reservation_id)
            .await?
        {
            warn!("Slot {} was not held by reservation {} at expiry",
                  reservation.slot_id, reservation_id);
        }

        info!("Reservation {} expired, slot {} reclaimed", reservation_id, reservation.slot_id);
        Ok(Reservation {
            status: ReservationStatus::Expired,
            ..reservation
        })
    }

    pub async fn get_reservation(
        &self,
        reservation_id: Uuid,
    ) -> Result<Reservation, BookingError> {
        self.reservations
            .get(reservation_id)
            .await?
            .ok_or(BookingError::ReservationNotFound)
    }

    /// Pending reservations whose hold window has fully elapsed. The
    /// boundary instant counts as elapsed.
    pub async fn list_expirable(&self) -> Result<Vec<Reservation>, BookingError> {
        let cutoff = self.clock.now() - self.hold_window;
        self.reservations.list_pending_older_than(cutoff).await
    }
}
