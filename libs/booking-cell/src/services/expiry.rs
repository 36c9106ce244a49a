use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::services::coordinator::ReservationCoordinator;

/// Outcome of one sweep, for logs and health checks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    pub expired: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Periodic reclamation of pending reservations that outlived the hold
/// window. A sweep tolerates partial failure (log and continue) and is safe
/// to overlap with itself or with user cancels: every transition it performs
/// is conditional in the stores, so a double-expire degrades to a no-op.
pub struct ExpiryScanner {
    coordinator: Arc<ReservationCoordinator>,
    scan_interval: Duration,
    is_shutdown: RwLock<bool>,
}

impl ExpiryScanner {
    pub fn new(coordinator: Arc<ReservationCoordinator>, scan_interval_seconds: u64) -> Self {
        Self {
            coordinator,
            scan_interval: Duration::from_secs(scan_interval_seconds),
            is_shutdown: RwLock::new(false),
        }
    }

    /// One sweep over all overdue pending reservations.
    pub async fn tick(&self) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();

        let due = match self.coordinator.list_expirable().await {
            Ok(due) => due,
            Err(e) => {
                warn!("Expiry sweep could not list reservations: {}", e);
                return outcome;
            }
        };

        if due.is_empty() {
            debug!("Expiry sweep found nothing to reclaim");
            return outcome;
        }

        for reservation in due {
            match self.coordinator.expire(reservation.id).await {
                Ok(expired) if expired.status == crate::models::ReservationStatus::Expired => {
                    outcome.expired += 1;
                }
                // Settled by a racing confirm or cancel between the listing
                // and the expire call.
                Ok(_) => outcome.skipped += 1,
                Err(e) => {
                    warn!("Failed to expire reservation {}: {}", reservation.id, e);
                    outcome.failed += 1;
                }
            }
        }

        info!(
            "Expiry sweep reclaimed {} reservation(s) ({} skipped, {} failed)",
            outcome.expired, outcome.skipped, outcome.failed
        );
        outcome
    }

    /// Interval loop for the hosting process; spawn with `tokio::spawn`.
    pub async fn run(&self) {
        info!("Expiry scanner started with interval {:?}", self.scan_interval);

        let mut interval = tokio::time::interval(self.scan_interval);
        loop {
            interval.tick().await;
            if *self.is_shutdown.read().await {
                break;
            }
            self.tick().await;
        }

        info!("Expiry scanner stopped");
    }

    pub async fn shutdown(&self) {
        let mut is_shutdown = self.is_shutdown.write().await;
        *is_shutdown = true;
    }
}
