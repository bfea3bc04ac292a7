use anyhow::Context;
use seatlock_api::{app, AppState};
use seatlock_core::SystemClock;
use seatlock_reservation::{ExpiryReconciler, ReservationManager, ReservationSettings};
use seatlock_store::{app_config::Config, EventProducer, SeatRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "seatlock_api=debug,seatlock_reservation=debug,seatlock_store=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    let reservation = &config.reservation;
    tracing::info!(
        "Starting Seatlock API on port {} with {} seats (lease {:?}, sweep {:?})",
        config.server.port,
        reservation.seat_count,
        reservation.lease_duration(),
        reservation.sweep_interval()
    );

    let registry = Arc::new(SeatRegistry::new(reservation.seat_count));
    let events = EventProducer::new(config.events.buffer);
    let manager = ReservationManager::new(
        registry,
        Arc::new(SystemClock),
        events,
        ReservationSettings {
            default_lease: reservation.lease_duration(),
            expiry_grace: reservation.expiry_grace(),
            per_claim_timers: reservation.per_claim_timers,
        },
    );

    // Expiry sweep runs until the server stops
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep = ExpiryReconciler::new(manager.clone(), reservation.sweep_interval()).spawn(shutdown_rx);

    let app = app(AppState::new(manager));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let _ = shutdown_tx.send(true);
    sweep.await.context("Expiry sweep panicked")?;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
