//! # State Actor Command Types
//!
//! Command and result types for the seat lock state actor. Each command
//! variant carries a oneshot response channel; the result flows back to the
//! issuing component once the actor has executed the command against the
//! lock record store.
//!
//! ## Command Pattern
//!
//! Arrival order in the actor inbox is the serialization order of the whole
//! system. A command completes its store round-trip before the next one is
//! dequeued, which is what makes non-atomic read-then-write store operations
//! safe without row locks.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::oneshot;

use crate::error::Result;
use crate::models::SeatLock;

/// Type alias for command response channels
pub type CommandResponder<T> = oneshot::Sender<Result<T>>;

/// A batch of expired records surfaced by a sweep
pub type ExpiredBatch = Vec<SeatLock>;

/// Natural key identifying a seat lock
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockKey {
    pub schedule_hash: String,
    pub seat_id: i64,
}

impl LockKey {
    pub fn new(schedule_hash: impl Into<String>, seat_id: i64) -> Self {
        Self {
            schedule_hash: schedule_hash.into(),
            seat_id,
        }
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.schedule_hash, self.seat_id)
    }
}

/// Commands for the seat lock state actor
#[derive(Debug)]
pub enum LockCommand {
    /// Create an UNPAID lock record for the key
    Create {
        key: LockKey,
        resp: CommandResponder<SeatLock>,
    },
    /// Promote the key's records to PAID; no-op when the key is missing
    MarkPaid {
        key: LockKey,
        resp: CommandResponder<MutationOutcome>,
    },
    /// Attach a booking reference to the key's records; no-op when missing
    AttachBooking {
        key: LockKey,
        booking_id: i64,
        resp: CommandResponder<MutationOutcome>,
    },
    /// Delete the key's records; no-op when missing
    Delete {
        key: LockKey,
        resp: CommandResponder<MutationOutcome>,
    },
    /// Collect UNPAID records at or past the expiry threshold, without deleting
    Sweep {
        resp: CommandResponder<ExpiredBatch>,
    },
    /// Get lock processing statistics
    GetProcessingStats {
        resp: CommandResponder<LockProcessingStats>,
    },
    /// Shutdown the state actor
    Shutdown { resp: CommandResponder<()> },
}

/// Outcome of a keyed mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationOutcome {
    /// The mutation touched `records` matching records
    Applied { records: u64 },
    /// No record matched the key; the store is unchanged
    NoOp,
}

impl MutationOutcome {
    /// Build an outcome from a store-reported affected count
    pub fn from_affected(records: u64) -> Self {
        if records == 0 {
            MutationOutcome::NoOp
        } else {
            MutationOutcome::Applied { records }
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, MutationOutcome::NoOp)
    }
}

/// Cumulative processing statistics for the state actor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockProcessingStats {
    pub locks_created: u64,
    pub payments_recorded: u64,
    pub bookings_attached: u64,
    pub locks_deleted: u64,
    pub sweeps_executed: u64,
    pub records_expired: u64,
    pub processing_errors: u64,
}
