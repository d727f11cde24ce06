//! # Lock Event Consumer
//!
//! Inbound half of the event bus adapter. Subscribes to the fanout exchange,
//! decodes each payload into a typed lock event, and issues the matching
//! command to the state actor.
//!
//! Decoding failures never stop the consume loop: a malformed payload, an
//! unknown message type, or a non-numeric seat identifier is logged and the
//! message dropped. The loop only exits when the stream ends or the state
//! actor inbox closes.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::actor::channels::LockCommandSender;
use crate::actor::commands::LockCommand;
use crate::error::{Result, SeatLockError};
use crate::messaging::bus::{EventBus, MessageStream};
use crate::messaging::envelope::{LockEvent, LockMessage};

/// Statistics for consumer observability
#[derive(Debug, Default)]
pub struct LockConsumerStats {
    /// Total number of payloads received from the bus
    pub events_received: AtomicU64,
    /// Lock confirmations dispatched as create commands
    pub locks_confirmed: AtomicU64,
    /// Payment completions dispatched as mark-paid commands
    pub payments_recorded: AtomicU64,
    /// Booking creations dispatched as attach-booking commands
    pub bookings_recorded: AtomicU64,
    /// Cancellations dispatched as delete commands
    pub cancellations_applied: AtomicU64,
    /// Payloads dropped because they failed to decode
    pub messages_dropped: AtomicU64,
    /// Commands that reached the actor but failed against the store
    pub dispatch_failures: AtomicU64,
}

impl LockConsumerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_events_received(&self) -> u64 {
        self.events_received.load(Ordering::Relaxed)
    }

    pub fn get_locks_confirmed(&self) -> u64 {
        self.locks_confirmed.load(Ordering::Relaxed)
    }

    pub fn get_payments_recorded(&self) -> u64 {
        self.payments_recorded.load(Ordering::Relaxed)
    }

    pub fn get_bookings_recorded(&self) -> u64 {
        self.bookings_recorded.load(Ordering::Relaxed)
    }

    pub fn get_cancellations_applied(&self) -> u64 {
        self.cancellations_applied.load(Ordering::Relaxed)
    }

    pub fn get_messages_dropped(&self) -> u64 {
        self.messages_dropped.load(Ordering::Relaxed)
    }

    pub fn get_dispatch_failures(&self) -> u64 {
        self.dispatch_failures.load(Ordering::Relaxed)
    }
}

/// Consumer bridging inbound bus messages to state actor commands
pub struct LockEventConsumer {
    /// Unique identifier for this consumer instance
    consumer_id: Uuid,
    /// Bus providing the subscription stream
    bus: Arc<dyn EventBus>,
    /// State actor inbox
    command_tx: LockCommandSender,
    /// Running state flag
    is_running: Arc<AtomicBool>,
    /// Statistics for observability
    stats: Arc<LockConsumerStats>,
    /// Stream processing task handle
    stream_handle: Option<JoinHandle<()>>,
}

impl LockEventConsumer {
    /// Create a new lock event consumer
    pub fn new(bus: Arc<dyn EventBus>, command_tx: LockCommandSender) -> Self {
        let consumer_id = Uuid::new_v4();

        info!(
            consumer_id = %consumer_id,
            provider = bus.provider_name(),
            "Creating lock event consumer"
        );

        Self {
            consumer_id,
            bus,
            command_tx,
            is_running: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(LockConsumerStats::new()),
            stream_handle: None,
        }
    }

    /// Subscribe to the bus and start the consume loop
    pub async fn start(&mut self) -> Result<()> {
        info!(
            consumer_id = %self.consumer_id,
            provider = self.bus.provider_name(),
            "Starting lock event consumer"
        );

        let stream = self.bus.subscribe().await?;

        let command_tx = self.command_tx.clone();
        let stats = self.stats.clone();
        let is_running = self.is_running.clone();
        let consumer_id = self.consumer_id;

        let handle = tokio::spawn(async move {
            Self::process_stream(stream, command_tx, stats, is_running, consumer_id).await;
        });

        self.is_running.store(true, Ordering::SeqCst);
        self.stream_handle = Some(handle);

        Ok(())
    }

    /// Stop the consumer and abort the stream task
    pub fn stop(&mut self) {
        info!(consumer_id = %self.consumer_id, "Stopping lock event consumer");
        self.is_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.stream_handle.take() {
            handle.abort();
        }
    }

    /// Check if the consumer is running
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Get consumer statistics
    pub fn get_stats(&self) -> Arc<LockConsumerStats> {
        self.stats.clone()
    }

    /// Core consume loop: decode each payload and dispatch its command
    async fn process_stream(
        mut stream: MessageStream,
        command_tx: LockCommandSender,
        stats: Arc<LockConsumerStats>,
        is_running: Arc<AtomicBool>,
        consumer_id: Uuid,
    ) {
        while let Some(payload) = stream.next().await {
            if !is_running.load(Ordering::Relaxed) {
                debug!(
                    consumer_id = %consumer_id,
                    "Lock event stream stopping (consumer stopped)"
                );
                break;
            }

            stats.events_received.fetch_add(1, Ordering::Relaxed);

            let event = match LockMessage::from_bytes(&payload).and_then(LockMessage::into_event) {
                Ok(event) => event,
                Err(e) => {
                    stats.messages_dropped.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        consumer_id = %consumer_id,
                        error = %e,
                        "Dropping undecodable lock message"
                    );
                    continue;
                }
            };

            match Self::dispatch(&command_tx, &stats, event).await {
                Ok(()) => {}
                Err(e @ SeatLockError::CommandChannel { .. }) => {
                    error!(
                        consumer_id = %consumer_id,
                        error = %e,
                        "State actor inbox closed - consume loop exiting"
                    );
                    break;
                }
                Err(e) => {
                    stats.dispatch_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        consumer_id = %consumer_id,
                        error = %e,
                        "Lock command failed for inbound event"
                    );
                }
            }
        }

        info!(consumer_id = %consumer_id, "Lock event stream ended");
    }

    /// Issue the command for a decoded event and await the actor's response
    ///
    /// Awaiting each response keeps inbound processing in lockstep with the
    /// actor, so one slow store operation applies backpressure to the bus
    /// instead of flooding the inbox.
    async fn dispatch(
        command_tx: &LockCommandSender,
        stats: &LockConsumerStats,
        event: LockEvent,
    ) -> Result<()> {
        match event {
            LockEvent::LockConfirmed { key } => {
                let (resp, rx) = oneshot::channel();
                command_tx
                    .send(LockCommand::Create { key, resp })
                    .await
                    .map_err(|_| SeatLockError::command_channel("State actor inbox closed"))?;
                rx.await
                    .map_err(|_| SeatLockError::command_channel("Create response dropped"))??;
                stats.locks_confirmed.fetch_add(1, Ordering::Relaxed);
            }
            LockEvent::PaymentCompleted { key } => {
                let (resp, rx) = oneshot::channel();
                command_tx
                    .send(LockCommand::MarkPaid { key, resp })
                    .await
                    .map_err(|_| SeatLockError::command_channel("State actor inbox closed"))?;
                rx.await
                    .map_err(|_| SeatLockError::command_channel("MarkPaid response dropped"))??;
                stats.payments_recorded.fetch_add(1, Ordering::Relaxed);
            }
            LockEvent::BookingCreated { key, booking_id } => {
                let (resp, rx) = oneshot::channel();
                command_tx
                    .send(LockCommand::AttachBooking {
                        key,
                        booking_id,
                        resp,
                    })
                    .await
                    .map_err(|_| SeatLockError::command_channel("State actor inbox closed"))?;
                rx.await.map_err(|_| {
                    SeatLockError::command_channel("AttachBooking response dropped")
                })??;
                stats.bookings_recorded.fetch_add(1, Ordering::Relaxed);
            }
            LockEvent::LockCancelled { key } => {
                let (resp, rx) = oneshot::channel();
                command_tx
                    .send(LockCommand::Delete { key, resp })
                    .await
                    .map_err(|_| SeatLockError::command_channel("State actor inbox closed"))?;
                rx.await
                    .map_err(|_| SeatLockError::command_channel("Delete response dropped"))??;
                stats.cancellations_applied.fetch_add(1, Ordering::Relaxed);
            }
        }

        Ok(())
    }
}
