use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use booking_cell::models::Reservation;
use booking_cell::router::{booking_routes, BookingCellState};
use booking_cell::services::clock::ManualClock;
use booking_cell::services::coordinator::ReservationCoordinator;
use booking_cell::services::refunds::RefundSink;
use booking_cell::services::store::{MemoryReservationStore, ReservationStore};
use slot_cell::models::NewSlot;
use slot_cell::services::store::{MemorySlotStore, SlotStore};

/// Captures refund requests so tests can assert the compensation contract.
struct RecordingRefundSink {
    refunds: Mutex<Vec<Uuid>>,
}

impl RecordingRefundSink {
    fn new() -> Self {
        Self {
            refunds: Mutex::new(Vec::new()),
        }
    }

    fn recorded(&self) -> Vec<Uuid> {
        self.refunds.lock().unwrap().clone()
    }
}

#[async_trait]
impl RefundSink for RecordingRefundSink {
    async fn trigger_refund(&self, reservation: &Reservation) {
        self.refunds.lock().unwrap().push(reservation.id);
    }
}

struct Harness {
    app: Router,
    slots: Arc<MemorySlotStore>,
    coordinator: Arc<ReservationCoordinator>,
    refunds: Arc<RecordingRefundSink>,
}

fn harness() -> Harness {
    let slots = Arc::new(MemorySlotStore::new());
    let reservations = Arc::new(MemoryReservationStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 6, 9, 12, 0, 0).unwrap(),
    ));
    let coordinator = Arc::new(ReservationCoordinator::new(
        slots.clone() as Arc<dyn SlotStore>,
        reservations as Arc<dyn ReservationStore>,
        clock,
        5,
    ));
    let refunds = Arc::new(RecordingRefundSink::new());
    let state = Arc::new(BookingCellState {
        coordinator: coordinator.clone(),
        refunds: refunds.clone() as Arc<dyn RefundSink>,
    });
    Harness {
        app: booking_routes(state),
        slots,
        coordinator,
        refunds,
    }
}

async fn create_slot(harness: &Harness) -> Uuid {
    harness
        .slots
        .create_slot(NewSlot {
            provider_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            duration_minutes: 45,
            description: None,
        })
        .await
        .unwrap()
        .id
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn reserve_returns_hold_with_expiry() {
    let harness = harness();
    let slot_id = create_slot(&harness).await;

    let response = harness
        .app
        .oneshot(post_json(
            "/",
            json!({ "slot_id": slot_id, "holder_id": Uuid::new_v4() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["reservation"]["status"], json!("pending"));
    assert!(body["hold_expires_at"].is_string());
}

#[tokio::test]
async fn reserving_a_held_slot_conflicts() {
    let harness = harness();
    let slot_id = create_slot(&harness).await;

    let first = harness
        .app
        .clone()
        .oneshot(post_json(
            "/",
            json!({ "slot_id": slot_id, "holder_id": Uuid::new_v4() }),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = harness
        .app
        .oneshot(post_json(
            "/",
            json!({ "slot_id": slot_id, "holder_id": Uuid::new_v4() }),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn reserve_unknown_slot_returns_not_found() {
    let harness = harness();

    let response = harness
        .app
        .oneshot(post_json(
            "/",
            json!({ "slot_id": Uuid::new_v4(), "holder_id": Uuid::new_v4() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn confirm_marks_reservation_paid() {
    let harness = harness();
    let slot_id = create_slot(&harness).await;

    let reservation = harness
        .coordinator
        .reserve(slot_id, Uuid::new_v4())
        .await
        .unwrap();

    let response = harness
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/{}/confirm", reservation.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["reservation"]["status"], json!("paid"));
    assert!(harness.refunds.recorded().is_empty());
}

#[tokio::test]
async fn lost_payment_race_answers_conflict_and_triggers_refund() {
    let harness = harness();
    let slot_id = create_slot(&harness).await;

    let reservation = harness
        .coordinator
        .reserve(slot_id, Uuid::new_v4())
        .await
        .unwrap();
    // The sweep reclaims the hold before the payment webhook lands.
    harness.coordinator.expire(reservation.id).await.unwrap();

    let response = harness
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/{}/confirm", reservation.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(harness.refunds.recorded(), vec![reservation.id]);
}

#[tokio::test]
async fn confirm_unknown_reservation_returns_not_found() {
    let harness = harness();

    let response = harness
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/{}/confirm", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_releases_the_hold() {
    let harness = harness();
    let slot_id = create_slot(&harness).await;

    let reservation = harness
        .coordinator
        .reserve(slot_id, Uuid::new_v4())
        .await
        .unwrap();

    let response = harness
        .app
        .oneshot(post_json(
            &format!("/{}/cancel", reservation.id),
            json!({ "cancelled_by": "holder", "reason": "changed my mind" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["reservation"]["status"], json!("cancelled"));

    let slot = harness.slots.get(slot_id).await.unwrap().unwrap();
    assert_eq!(slot.state, slot_cell::models::SlotState::Active);
}

#[tokio::test]
async fn get_reservation_round_trips() {
    let harness = harness();
    let slot_id = create_slot(&harness).await;

    let reservation = harness
        .coordinator
        .reserve(slot_id, Uuid::new_v4())
        .await
        .unwrap();

    let response = harness
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/{}", reservation.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["reservation"]["id"], json!(reservation.id));

    let missing = harness
        .app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
