//! # Seat Lock State Actor
//!
//! Single-writer actor owning every mutation of the lock record store.
//! Components never touch the store directly; they send [`LockCommand`]s
//! into the actor inbox and await the oneshot response. Commands are
//! processed strictly in arrival order, one store round-trip at a time,
//! which serializes concurrent traffic (inbound events, sweep ticks,
//! outbound deletions) without any row-level locking.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::actor::channels::{ChannelFactory, LockCommandReceiver, LockCommandSender};
use crate::actor::commands::{
    CommandResponder, ExpiredBatch, LockCommand, LockKey, LockProcessingStats, MutationOutcome,
};
use crate::error::{Result, SeatLockError};
use crate::models::{NewSeatLock, SeatLock};
use crate::store::LockStore;

/// Actor owning the seat lock store and processing commands sequentially
#[derive(Debug)]
pub struct StateActor {
    /// Lock record store this actor exclusively mutates
    store: Arc<dyn LockStore>,
    /// Age at which an UNPAID lock counts as expired
    expiry_threshold: Duration,
    /// Command receiver channel, consumed on start
    command_rx: Option<LockCommandReceiver>,
    /// Command loop task handle
    task_handle: Option<JoinHandle<()>>,
    /// Statistics tracking
    stats: Arc<std::sync::RwLock<LockProcessingStats>>,
}

impl StateActor {
    /// Create a new state actor and the sender half of its inbox
    pub fn new(
        store: Arc<dyn LockStore>,
        expiry_threshold: Duration,
        buffer_size: usize,
    ) -> (Self, LockCommandSender) {
        let (command_tx, command_rx) = ChannelFactory::lock_command_channel(buffer_size);
        let stats = Arc::new(std::sync::RwLock::new(LockProcessingStats::default()));

        info!(
            provider = store.provider_name(),
            expiry_threshold_secs = expiry_threshold.as_secs(),
            buffer_size = buffer_size,
            "Creating seat lock state actor"
        );

        let actor = Self {
            store,
            expiry_threshold,
            command_rx: Some(command_rx),
            task_handle: None,
            stats,
        };

        (actor, command_tx)
    }

    /// Start the command processing loop
    ///
    /// Spawns the actor task. The loop exits when every sender clone has
    /// been dropped and the inbox drains.
    pub async fn start(&mut self) -> Result<()> {
        info!("Starting seat lock state actor");

        let store = self.store.clone();
        let stats = self.stats.clone();
        let expiry_threshold = self.expiry_threshold;
        let mut command_rx = self
            .command_rx
            .take()
            .ok_or_else(|| SeatLockError::internal("State actor already started"))?;

        let handle = tokio::spawn(async move {
            let handler = LockCommandHandler::new(store, expiry_threshold, stats);
            while let Some(command) = command_rx.recv().await {
                handler.process_command(command).await;
            }
            debug!("State actor inbox closed - command loop exiting");
        });

        self.task_handle = Some(handle);
        Ok(())
    }

    /// Abort the command loop task; commands still queued in the inbox are dropped
    pub fn abort(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }

    /// Snapshot of cumulative processing statistics
    pub fn stats(&self) -> LockProcessingStats {
        self.stats.read().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

/// Internal command handler owning the store access logic
///
/// Separated from the actor so the lifecycle management (channel take,
/// task spawn, abort) stays apart from the per-command semantics.
#[derive(Debug)]
struct LockCommandHandler {
    store: Arc<dyn LockStore>,
    expiry_threshold: Duration,
    stats: Arc<std::sync::RwLock<LockProcessingStats>>,
}

impl LockCommandHandler {
    fn new(
        store: Arc<dyn LockStore>,
        expiry_threshold: Duration,
        stats: Arc<std::sync::RwLock<LockProcessingStats>>,
    ) -> Self {
        Self {
            store,
            expiry_threshold,
            stats,
        }
    }

    /// Process a single command and send the result to the caller
    async fn process_command(&self, command: LockCommand) {
        match command {
            LockCommand::Create { key, resp } => {
                self.execute_with_stats(
                    self.handle_create(key),
                    |stats| &mut stats.locks_created,
                    resp,
                )
                .await;
            }
            LockCommand::MarkPaid { key, resp } => {
                self.execute_with_stats(
                    self.handle_mark_paid(key),
                    |stats| &mut stats.payments_recorded,
                    resp,
                )
                .await;
            }
            LockCommand::AttachBooking {
                key,
                booking_id,
                resp,
            } => {
                self.execute_with_stats(
                    self.handle_attach_booking(key, booking_id),
                    |stats| &mut stats.bookings_attached,
                    resp,
                )
                .await;
            }
            LockCommand::Delete { key, resp } => {
                self.execute_with_stats(
                    self.handle_delete(key),
                    |stats| &mut stats.locks_deleted,
                    resp,
                )
                .await;
            }
            LockCommand::Sweep { resp } => {
                let result = self.handle_sweep().await;
                {
                    let mut stats = self.stats.write().unwrap_or_else(|p| p.into_inner());
                    match &result {
                        Ok(batch) => {
                            stats.sweeps_executed += 1;
                            stats.records_expired += batch.len() as u64;
                        }
                        Err(_) => stats.processing_errors += 1,
                    }
                }
                if resp.send(result).is_err() {
                    error!("Sweep response channel closed - receiver dropped");
                }
            }
            LockCommand::GetProcessingStats { resp } => {
                let stats_copy = self.stats.read().unwrap_or_else(|p| p.into_inner()).clone();
                if resp.send(Ok(stats_copy)).is_err() {
                    error!("GetProcessingStats response channel closed - receiver dropped");
                }
            }
            LockCommand::Shutdown { resp } => {
                info!("State actor received shutdown command");
                if resp.send(Ok(())).is_err() {
                    error!("Shutdown response channel closed - receiver dropped");
                }
            }
        }
    }

    /// Run a command handler, record its outcome in stats, and respond
    async fn execute_with_stats<T, Fut>(
        &self,
        handler: Fut,
        stat_selector: impl FnOnce(&mut LockProcessingStats) -> &mut u64,
        resp: CommandResponder<T>,
    ) where
        Fut: Future<Output = Result<T>>,
        T: std::fmt::Debug,
    {
        let result = handler.await;
        let was_success = result.is_ok();

        if let Err(e) = &result {
            error!(error = %e, "Lock command failed against the store");
        }

        {
            let mut stats = self.stats.write().unwrap_or_else(|p| p.into_inner());
            if was_success {
                *stat_selector(&mut stats) += 1;
            } else {
                stats.processing_errors += 1;
            }
        }

        if resp.send(result).is_err() {
            error!(
                was_success = was_success,
                "Command response channel closed - receiver dropped before response could be sent"
            );
        }
    }

    async fn handle_create(&self, key: LockKey) -> Result<SeatLock> {
        debug!(key = %key, "Creating seat lock");
        self.store
            .insert(NewSeatLock {
                schedule_hash: key.schedule_hash,
                seat_id: key.seat_id,
            })
            .await
    }

    async fn handle_mark_paid(&self, key: LockKey) -> Result<MutationOutcome> {
        let affected = self.store.mark_paid(&key.schedule_hash, key.seat_id).await?;
        let outcome = MutationOutcome::from_affected(affected);
        if outcome.is_noop() {
            debug!(key = %key, "MarkPaid matched no record - lock already expired or cancelled");
        }
        Ok(outcome)
    }

    async fn handle_attach_booking(
        &self,
        key: LockKey,
        booking_id: i64,
    ) -> Result<MutationOutcome> {
        let affected = self
            .store
            .attach_booking(&key.schedule_hash, key.seat_id, booking_id)
            .await?;
        let outcome = MutationOutcome::from_affected(affected);
        if outcome.is_noop() {
            debug!(
                key = %key,
                booking_id = booking_id,
                "AttachBooking matched no record - lock already expired or cancelled"
            );
        }
        Ok(outcome)
    }

    async fn handle_delete(&self, key: LockKey) -> Result<MutationOutcome> {
        let affected = self
            .store
            .delete_by_key(&key.schedule_hash, key.seat_id)
            .await?;
        Ok(MutationOutcome::from_affected(affected))
    }

    /// Collect expired UNPAID records without deleting them
    ///
    /// The cutoff is inclusive: a record created exactly `expiry_threshold`
    /// ago is already expired. Deletion is a separate command the outbound
    /// relay issues per record once the batch is handed over, so a record
    /// is not removed before its cancellation flow has run.
    async fn handle_sweep(&self) -> Result<ExpiredBatch> {
        let threshold = chrono::Duration::from_std(self.expiry_threshold).map_err(|e| {
            SeatLockError::configuration("state_actor", format!("Expiry threshold out of range: {e}"))
        })?;
        let cutoff = chrono::Utc::now().naive_utc() - threshold;

        let expired = self.store.find_expired_unpaid(cutoff).await?;
        if !expired.is_empty() {
            info!(
                expired_count = expired.len(),
                "Sweep found expired unpaid locks"
            );
        }
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LockStatus;
    use crate::store::InMemoryLockStore;
    use tokio::sync::oneshot;

    async fn started_actor(
        threshold: Duration,
    ) -> (Arc<InMemoryLockStore>, StateActor, LockCommandSender) {
        let store = Arc::new(InMemoryLockStore::new());
        let (mut actor, sender) = StateActor::new(store.clone(), threshold, 16);
        actor.start().await.unwrap();
        (store, actor, sender)
    }

    async fn create(sender: &LockCommandSender, key: LockKey) -> SeatLock {
        let (resp, rx) = oneshot::channel();
        sender
            .send(LockCommand::Create { key, resp })
            .await
            .unwrap();
        rx.await.unwrap().unwrap()
    }

    async fn mark_paid(sender: &LockCommandSender, key: LockKey) -> MutationOutcome {
        let (resp, rx) = oneshot::channel();
        sender
            .send(LockCommand::MarkPaid { key, resp })
            .await
            .unwrap();
        rx.await.unwrap().unwrap()
    }

    async fn delete(sender: &LockCommandSender, key: LockKey) -> MutationOutcome {
        let (resp, rx) = oneshot::channel();
        sender
            .send(LockCommand::Delete { key, resp })
            .await
            .unwrap();
        rx.await.unwrap().unwrap()
    }

    async fn sweep(sender: &LockCommandSender) -> ExpiredBatch {
        let (resp, rx) = oneshot::channel();
        sender.send(LockCommand::Sweep { resp }).await.unwrap();
        rx.await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_create_round_trip() {
        let (_store, _actor, sender) = started_actor(Duration::from_secs(420)).await;

        let lock = create(&sender, LockKey::new("hash_a", 7)).await;

        assert_eq!(lock.schedule_hash, "hash_a");
        assert_eq!(lock.seat_id, 7);
        assert_eq!(lock.status, LockStatus::Unpaid.as_str());
        assert!(lock.booking_id.is_none());
    }

    #[tokio::test]
    async fn test_mutations_on_missing_key_are_noops() {
        let (store, actor, sender) = started_actor(Duration::from_secs(420)).await;

        let outcome = mark_paid(&sender, LockKey::new("hash_missing", 1)).await;
        assert!(outcome.is_noop());

        let outcome = delete(&sender, LockKey::new("hash_missing", 1)).await;
        assert!(outcome.is_noop());

        let (resp, rx) = oneshot::channel();
        sender
            .send(LockCommand::AttachBooking {
                key: LockKey::new("hash_missing", 1),
                booking_id: 42,
                resp,
            })
            .await
            .unwrap();
        assert!(rx.await.unwrap().unwrap().is_noop());

        assert_eq!(store.record_count().await, 0);
        assert_eq!(actor.stats().processing_errors, 0);
    }

    #[tokio::test]
    async fn test_attach_booking_then_mark_paid() {
        let (store, _actor, sender) = started_actor(Duration::from_secs(420)).await;
        let key = LockKey::new("hash_b", 3);

        create(&sender, key.clone()).await;

        let (resp, rx) = oneshot::channel();
        sender
            .send(LockCommand::AttachBooking {
                key: key.clone(),
                booking_id: 99,
                resp,
            })
            .await
            .unwrap();
        assert_eq!(
            rx.await.unwrap().unwrap(),
            MutationOutcome::Applied { records: 1 }
        );

        assert_eq!(
            mark_paid(&sender, key).await,
            MutationOutcome::Applied { records: 1 }
        );

        let record = store.find_by_key("hash_b", 3).await.unwrap().unwrap();
        assert_eq!(record.status, LockStatus::Paid.as_str());
        assert_eq!(record.booking_id, Some(99));
    }

    #[tokio::test]
    async fn test_sweep_returns_expired_without_deleting() {
        let threshold = Duration::from_secs(420);
        let (store, _actor, sender) = started_actor(threshold).await;

        create(&sender, LockKey::new("hash_old", 1)).await;
        create(&sender, LockKey::new("hash_fresh", 2)).await;

        let stale = chrono::Utc::now().naive_utc() - chrono::Duration::seconds(421);
        store.backdate_created_at("hash_old", 1, stale).await;

        let expired = sweep(&sender).await;
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].schedule_hash, "hash_old");

        // Sweep is read-only; both records are still present
        assert_eq!(store.record_count().await, 2);

        // And therefore idempotent until a delete lands
        let again = sweep(&sender).await;
        assert_eq!(again.len(), 1);

        delete(&sender, LockKey::new("hash_old", 1)).await;
        assert!(sweep(&sender).await.is_empty());
    }

    #[tokio::test]
    async fn test_start_twice_errors() {
        let store = Arc::new(InMemoryLockStore::new());
        let (mut actor, _sender) = StateActor::new(store, Duration::from_secs(60), 4);

        actor.start().await.unwrap();
        let result = actor.start().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_stats_and_shutdown() {
        let (_store, actor, sender) = started_actor(Duration::from_secs(420)).await;

        create(&sender, LockKey::new("hash_s", 1)).await;
        mark_paid(&sender, LockKey::new("hash_s", 1)).await;
        sweep(&sender).await;

        let (resp, rx) = oneshot::channel();
        sender
            .send(LockCommand::GetProcessingStats { resp })
            .await
            .unwrap();
        let stats = rx.await.unwrap().unwrap();
        assert_eq!(stats.locks_created, 1);
        assert_eq!(stats.payments_recorded, 1);
        assert_eq!(stats.sweeps_executed, 1);
        assert_eq!(stats.records_expired, 0);
        assert_eq!(stats.processing_errors, 0);

        let (resp, rx) = oneshot::channel();
        sender.send(LockCommand::Shutdown { resp }).await.unwrap();
        rx.await.unwrap().unwrap();

        // Actor-held snapshot agrees with the command response
        assert_eq!(actor.stats().locks_created, 1);
    }
}
