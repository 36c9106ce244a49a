use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use booking_cell::router::BookingCellState;
use booking_cell::services::clock::SystemClock;
use booking_cell::services::coordinator::ReservationCoordinator;
use booking_cell::services::expiry::ExpiryScanner;
use booking_cell::services::refunds::LoggingRefundSink;
use booking_cell::services::store::MemoryReservationStore;
use shared_config::AppConfig;
use slot_cell::router::SlotCellState;
use slot_cell::services::store::MemorySlotStore;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Carebook API server");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());

    // Stores are the single source of truth for slot and reservation state
    let slot_store = Arc::new(MemorySlotStore::new());
    let reservation_store = Arc::new(MemoryReservationStore::new());

    let coordinator = Arc::new(ReservationCoordinator::new(
        slot_store.clone(),
        reservation_store,
        Arc::new(SystemClock),
        config.hold_window_minutes,
    ));

    // Background reclamation of unpaid holds
    let scanner = Arc::new(ExpiryScanner::new(
        coordinator.clone(),
        config.scan_interval_seconds,
    ));
    {
        let scanner = Arc::clone(&scanner);
        tokio::spawn(async move { scanner.run().await });
    }

    let slot_state = Arc::new(SlotCellState {
        store: slot_store,
        config: config.clone(),
    });
    let booking_state = Arc::new(BookingCellState {
        coordinator,
        refunds: Arc::new(LoggingRefundSink),
    });

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(slot_state, booking_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
