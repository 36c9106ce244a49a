use async_trait::async_trait;
use tracing::warn;

use crate::models::Reservation;

/// Port to the payment collaborator's compensation path. Fired whenever a
/// confirmed payment lost the race against expiry, so the money is refunded
/// rather than silently dropped. Deployments wire a real gateway client
/// behind this trait.
#[async_trait]
pub trait RefundSink: Send + Sync {
    async fn trigger_refund(&self, reservation: &Reservation);
}

/// Default sink: surface the compensation request to the operator log.
pub struct LoggingRefundSink;

#[async_trait]
impl RefundSink for LoggingRefundSink {
    async fn trigger_refund(&self, reservation: &Reservation) {
        warn!(
            "Refund required: reservation {} (holder {}, slot {}) was paid after its hold expired",
            reservation.id, reservation.holder_id, reservation.slot_id
        );
    }
}
