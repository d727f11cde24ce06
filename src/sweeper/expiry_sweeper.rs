//! # Expiry Sweeper Service
//!
//! Interval-driven scheduler that asks the state actor to collect expired
//! UNPAID locks and forwards each non-empty batch to the outbound relay.
//!
//! ## Architecture
//!
//! - **Polling Loop**: Uses `tokio::time::interval` for periodic sweep ticks
//! - **Read-Only Ticks**: A sweep never deletes; the outbound relay issues
//!   one delete command per record after the batch is handed over
//! - **Overlap Tolerance**: A batch dropped because the relay is backed up is
//!   re-collected on the next tick, making duplicate ticks harmless
//! - **Observability**: Atomic counters for cycles, forwards, and drops

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument, warn};

use crate::actor::channels::{ExpiredBatchSender, LockCommandSender};
use crate::actor::commands::LockCommand;
use crate::error::{Result, SeatLockError};

/// Configuration for the expiry sweeper
#[derive(Debug, Clone)]
pub struct ExpirySweeperConfig {
    /// Interval between sweep ticks
    pub sweep_interval: Duration,
}

impl Default for ExpirySweeperConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(crate::constants::defaults::SWEEP_INTERVAL_SECS),
        }
    }
}

impl ExpirySweeperConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval.is_zero() {
            return Err(SeatLockError::configuration(
                "expiry_sweeper",
                "sweep_interval must be greater than zero",
            ));
        }

        Ok(())
    }
}

/// Statistics for sweeper observability
#[derive(Debug, Default)]
pub struct ExpirySweeperStats {
    /// Total number of sweep cycles executed
    pub sweep_cycles: AtomicU64,
    /// Total number of expired batches forwarded to the outbound relay
    pub batches_forwarded: AtomicU64,
    /// Total number of batches dropped because the relay was backed up
    pub batches_dropped: AtomicU64,
    /// Total number of sweep cycles that failed
    pub sweep_errors: AtomicU64,
}

impl ExpirySweeperStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_sweep_cycles(&self) -> u64 {
        self.sweep_cycles.load(Ordering::Relaxed)
    }

    pub fn get_batches_forwarded(&self) -> u64 {
        self.batches_forwarded.load(Ordering::Relaxed)
    }

    pub fn get_batches_dropped(&self) -> u64 {
        self.batches_dropped.load(Ordering::Relaxed)
    }

    pub fn get_sweep_errors(&self) -> u64 {
        self.sweep_errors.load(Ordering::Relaxed)
    }
}

/// Scheduler that drives periodic expiry sweeps through the state actor
pub struct ExpirySweeper {
    /// State actor inbox for issuing sweep commands
    command_tx: LockCommandSender,
    /// Channel carrying expired batches to the outbound relay
    batch_tx: ExpiredBatchSender,
    /// Sweeper configuration
    config: ExpirySweeperConfig,
    /// Running state flag
    running: Arc<AtomicBool>,
    /// Statistics for observability
    stats: Arc<ExpirySweeperStats>,
}

impl ExpirySweeper {
    /// Create a new expiry sweeper
    pub fn new(
        command_tx: LockCommandSender,
        batch_tx: ExpiredBatchSender,
        config: ExpirySweeperConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            command_tx,
            batch_tx,
            config,
            running: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(ExpirySweeperStats::new()),
        })
    }

    /// Start the sweep loop
    #[instrument(skip(self), fields(sweep_interval = ?self.config.sweep_interval))]
    pub async fn start(self: Arc<Self>) -> Result<()> {
        info!(
            sweep_interval = ?self.config.sweep_interval,
            "Starting expiry sweeper"
        );

        self.running.store(true, Ordering::SeqCst);

        let sweeper = self.clone();
        tokio::spawn(async move {
            sweeper.sweep_loop().await;
        });

        Ok(())
    }

    /// Stop the sweeper; the loop exits at its next tick
    pub fn stop(&self) {
        info!("Stopping expiry sweeper");
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the sweeper is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get sweeper statistics
    pub fn get_stats(&self) -> Arc<ExpirySweeperStats> {
        self.stats.clone()
    }

    /// Main sweep loop
    async fn sweep_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.config.sweep_interval);

        while self.running.load(Ordering::SeqCst) {
            interval.tick().await;

            self.stats.sweep_cycles.fetch_add(1, Ordering::Relaxed);

            match self.sweep_once().await {
                Ok(()) => {}
                Err(SeatLockError::CommandChannel { .. }) => {
                    error!("Downstream channel closed - sweep loop exiting");
                    break;
                }
                Err(e) => {
                    self.stats.sweep_errors.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %e, "Sweep cycle failed");
                }
            }
        }

        info!("Sweep loop exited");
    }

    /// Execute a single sweep tick
    #[instrument(skip(self))]
    async fn sweep_once(&self) -> Result<()> {
        let (resp, rx) = oneshot::channel();
        self.command_tx
            .send(LockCommand::Sweep { resp })
            .await
            .map_err(|_| SeatLockError::command_channel("State actor inbox closed"))?;

        let expired = rx
            .await
            .map_err(|_| SeatLockError::command_channel("Sweep response channel dropped"))??;

        if expired.is_empty() {
            debug!("Sweep found no expired locks");
            return Ok(());
        }

        let expired_count = expired.len();
        match self.batch_tx.try_send(expired) {
            Ok(()) => {
                self.stats.batches_forwarded.fetch_add(1, Ordering::Relaxed);
                debug!(
                    expired_count = expired_count,
                    "Forwarded expired batch to outbound relay"
                );
            }
            Err(TrySendError::Full(_)) => {
                self.stats.batches_dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    expired_count = expired_count,
                    "Outbound relay backed up - dropping batch, records stay for the next sweep"
                );
            }
            Err(TrySendError::Closed(_)) => {
                return Err(SeatLockError::command_channel("Expired batch channel closed"));
            }
        }

        Ok(())
    }
}
