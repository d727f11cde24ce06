//! # Cancellation Relay
//!
//! Outbound half of the event bus adapter. Drains expired record batches
//! from the sweeper and, for each record in sweep order: deletes it through
//! the state actor, notifies the booking service of the timeout, and
//! publishes a lock-cancelled envelope onto the bus.
//!
//! Notification and publish are best-effort per record. A failure is logged
//! and the remaining steps and records still run; the delete that already
//! happened is never undone, so a missed announcement costs at most one
//! downstream release (subscribers treat releases as idempotent).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::actor::channels::{ExpiredBatchReceiver, LockCommandSender};
use crate::actor::commands::{ExpiredBatch, LockCommand, LockKey};
use crate::client::BookingApiClient;
use crate::error::{Result, SeatLockError};
use crate::messaging::bus::EventBus;
use crate::messaging::envelope::LockMessage;
use crate::models::SeatLock;

/// Statistics for relay observability
#[derive(Debug, Default)]
pub struct CancellationRelayStats {
    /// Total number of expired batches received from the sweeper
    pub batches_received: AtomicU64,
    /// Expired records deleted through the state actor
    pub locks_cancelled: AtomicU64,
    /// Records whose delete command failed against the store
    pub delete_failures: AtomicU64,
    /// Timeout notifications accepted by the booking service
    pub notifications_sent: AtomicU64,
    /// Timeout notifications that failed
    pub notification_failures: AtomicU64,
    /// Lock-cancelled envelopes published onto the bus
    pub cancellations_published: AtomicU64,
    /// Publishes that failed
    pub publish_failures: AtomicU64,
}

impl CancellationRelayStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_batches_received(&self) -> u64 {
        self.batches_received.load(Ordering::Relaxed)
    }

    pub fn get_locks_cancelled(&self) -> u64 {
        self.locks_cancelled.load(Ordering::Relaxed)
    }

    pub fn get_notifications_sent(&self) -> u64 {
        self.notifications_sent.load(Ordering::Relaxed)
    }

    pub fn get_cancellations_published(&self) -> u64 {
        self.cancellations_published.load(Ordering::Relaxed)
    }
}

/// Relay draining expired batches into deletes, notifications, and publishes
pub struct CancellationRelay {
    /// Expired batch channel, consumed on start
    batch_rx: Option<ExpiredBatchReceiver>,
    /// State actor inbox for delete commands
    command_tx: LockCommandSender,
    /// Bus for publishing lock-cancelled envelopes
    bus: Arc<dyn EventBus>,
    /// Booking service client; None disables timeout notifications
    notifier: Option<BookingApiClient>,
    /// Relay task handle
    task_handle: Option<JoinHandle<()>>,
    /// Statistics for observability
    stats: Arc<CancellationRelayStats>,
}

impl CancellationRelay {
    /// Create a new cancellation relay
    pub fn new(
        batch_rx: ExpiredBatchReceiver,
        command_tx: LockCommandSender,
        bus: Arc<dyn EventBus>,
        notifier: Option<BookingApiClient>,
    ) -> Self {
        info!(
            provider = bus.provider_name(),
            notifications_enabled = notifier.is_some(),
            "Creating cancellation relay"
        );

        Self {
            batch_rx: Some(batch_rx),
            command_tx,
            bus,
            notifier,
            task_handle: None,
            stats: Arc::new(CancellationRelayStats::new()),
        }
    }

    /// Start draining expired batches
    ///
    /// The relay task exits when the sweeper side of the batch channel is
    /// dropped and the channel drains.
    pub fn start(&mut self) -> Result<()> {
        info!("Starting cancellation relay");

        let mut batch_rx = self
            .batch_rx
            .take()
            .ok_or_else(|| SeatLockError::internal("Cancellation relay already started"))?;

        let worker = RelayWorker {
            command_tx: self.command_tx.clone(),
            bus: self.bus.clone(),
            notifier: self.notifier.clone(),
            stats: self.stats.clone(),
        };

        let handle = tokio::spawn(async move {
            while let Some(batch) = batch_rx.recv().await {
                worker.process_batch(batch).await;
            }
            debug!("Expired batch channel closed - cancellation relay exiting");
        });

        self.task_handle = Some(handle);
        Ok(())
    }

    /// Abort the relay task; batches still queued are dropped
    pub fn abort(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }

    /// Get relay statistics
    pub fn get_stats(&self) -> Arc<CancellationRelayStats> {
        self.stats.clone()
    }
}

/// Internal worker owning the per-record cancellation sequence
#[derive(Debug)]
struct RelayWorker {
    command_tx: LockCommandSender,
    bus: Arc<dyn EventBus>,
    notifier: Option<BookingApiClient>,
    stats: Arc<CancellationRelayStats>,
}

impl RelayWorker {
    /// Process one expired batch, record by record in sweep order
    async fn process_batch(&self, batch: ExpiredBatch) {
        self.stats.batches_received.fetch_add(1, Ordering::Relaxed);

        info!(record_count = batch.len(), "Processing expired lock batch");

        for record in batch {
            self.process_record(record).await;
        }
    }

    /// Run the cancellation sequence for a single expired record
    ///
    /// Delete first, then notify, then publish. A store error on the delete
    /// skips the announcement steps; the record is still present and the next
    /// sweep retries the whole sequence. Announcement failures never roll
    /// back the delete.
    async fn process_record(&self, record: SeatLock) {
        let key = LockKey::new(record.schedule_hash.clone(), record.seat_id);

        debug!(key = %key, record_id = record.id, "Cancelling expired lock");

        match self.delete_record(key.clone()).await {
            Ok(()) => {
                self.stats.locks_cancelled.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.stats.delete_failures.fetch_add(1, Ordering::Relaxed);
                error!(
                    key = %key,
                    error = %e,
                    "Failed to delete expired lock - will retry on the next sweep"
                );
                return;
            }
        }

        if let Some(notifier) = &self.notifier {
            match notifier.notify_timeout(&key.schedule_hash, key.seat_id).await {
                Ok(()) => {
                    self.stats.notifications_sent.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    self.stats
                        .notification_failures
                        .fetch_add(1, Ordering::Relaxed);
                    warn!(
                        key = %key,
                        error = %e,
                        "Booking timeout notification failed - continuing"
                    );
                }
            }
        }

        let envelope = LockMessage::lock_cancelled(key.schedule_hash.clone(), key.seat_id);
        match self.bus.publish(&envelope).await {
            Ok(()) => {
                self.stats
                    .cancellations_published
                    .fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.stats.publish_failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    key = %key,
                    error = %e,
                    "Failed to publish lock cancellation - continuing"
                );
            }
        }
    }

    /// Issue the delete command and await the actor's response
    async fn delete_record(&self, key: LockKey) -> Result<()> {
        let (resp, rx) = oneshot::channel();
        self.command_tx
            .send(LockCommand::Delete { key, resp })
            .await
            .map_err(|_| SeatLockError::command_channel("State actor inbox closed"))?;

        // A no-op outcome means the record was already removed, usually by an
        // inbound cancellation; the announcement still goes out
        rx.await
            .map_err(|_| SeatLockError::command_channel("Delete response dropped"))??;

        Ok(())
    }
}
