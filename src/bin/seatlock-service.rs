//! Seat Lock State Service
//!
//! Standalone binary wiring the state actor, bus consumer, expiry sweeper,
//! cancellation relay, and status endpoints into one process.

use std::sync::Arc;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info};

use seatlock_core::actor::{ChannelFactory, LockCommand, StateActor};
use seatlock_core::client::{BookingApiClient, BookingApiConfig};
use seatlock_core::config::SeatLockConfig;
use seatlock_core::database::{DatabaseConnection, DatabaseMigrations};
use seatlock_core::logging::init_structured_logging;
use seatlock_core::messaging::{
    CancellationRelay, EventBusConfig, LockEventConsumer, RabbitMqEventBus,
};
use seatlock_core::store::{LockStore, PgLockStore};
use seatlock_core::sweeper::{ExpirySweeper, ExpirySweeperConfig};
use seatlock_core::web::{self, AppState};
use seatlock_core::SeatLockError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_structured_logging();

    let config = SeatLockConfig::from_env()?;
    info!(
        exchange = %config.exchange_name,
        bind_address = %config.bind_address,
        sweep_interval_secs = config.sweep_interval_secs,
        expiry_threshold_secs = config.expiry_threshold_secs,
        "Starting seat lock state service"
    );

    // Database connection and schema bootstrap
    let db = DatabaseConnection::from_url(&config.database_url).await?;
    DatabaseMigrations::run_all(db.pool()).await?;

    // Lock store; an unreachable store is fatal at startup
    let store: Arc<dyn LockStore> = Arc::new(PgLockStore::new(db.pool().clone()));
    if !store.health_check().await? {
        return Err(SeatLockError::database_connection(
            "Lock store failed its startup health check",
        )
        .into());
    }

    // State actor owns all writes from here on
    let (mut actor, command_tx) =
        StateActor::new(store, config.expiry_threshold(), config.command_buffer_size);
    actor.start().await?;

    // Message bus; without it there is nothing to consume, so failure is fatal
    let bus = Arc::new(
        RabbitMqEventBus::connect(EventBusConfig {
            url: config.amqp_url.clone(),
            exchange_name: config.exchange_name.clone(),
        })
        .await?,
    );

    // Inbound event consumer
    let mut consumer = LockEventConsumer::new(bus.clone(), command_tx.clone());
    consumer.start().await?;

    // Sweeper and cancellation relay share the expired batch channel
    let (batch_tx, batch_rx) =
        ChannelFactory::expired_batch_channel(config.expired_batch_buffer_size);

    let sweeper = Arc::new(ExpirySweeper::new(
        command_tx.clone(),
        batch_tx,
        ExpirySweeperConfig {
            sweep_interval: config.sweep_interval(),
        },
    )?);
    sweeper.clone().start().await?;

    let notifier = if config.booking_notify_enabled {
        Some(BookingApiClient::new(BookingApiConfig {
            base_url: config.booking_base_url.clone(),
            timeout_ms: config.notify_timeout_ms,
            token: config.notify_token.clone(),
        })?)
    } else {
        info!("Booking timeout notifications disabled");
        None
    };

    let mut relay = CancellationRelay::new(batch_rx, command_tx.clone(), bus.clone(), notifier);
    relay.start()?;

    // Status and health endpoints
    let app = web::create_app(AppState::new(db.pool().clone(), bus.clone()));
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(bind_address = %config.bind_address, "Status endpoints listening");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Web server error");
        }
    });

    info!("Seat lock state service started");

    // Wait for shutdown signal
    signal::ctrl_c().await?;
    info!("Shutdown signal received");

    // Stop intake first, then let the actor drain its inbox
    sweeper.stop();
    consumer.stop();

    let (resp, rx) = oneshot::channel();
    if command_tx.send(LockCommand::Shutdown { resp }).await.is_ok() {
        let _ = rx.await;
    }

    relay.abort();
    actor.abort();
    db.close().await;

    info!("Seat lock state service stopped");

    Ok(())
}
