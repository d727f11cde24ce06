//! # Lock Record Store
//!
//! Provider-agnostic persistence for seat lock records. The store owns no
//! concurrency policy; the state actor is its only mutating caller and
//! serializes every operation.
//!
//! ## Providers
//!
//! - [`PgLockStore`] - PostgreSQL-backed store used in production
//! - [`InMemoryLockStore`] - in-memory store for testing and development

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::{LockStatus, NewSeatLock, SeatLock};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryLockStore;
pub use postgres::PgLockStore;

/// Persistence operations over seat lock records
///
/// Mutating operations are keyed by the (schedule_hash, seat_id) natural key
/// and report how many records they touched; a count of zero is the no-op
/// outcome for a missing key, never an error. Implementations must allow
/// duplicate natural keys and resolve key lookups to the earliest record.
#[async_trait]
pub trait LockStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a new UNPAID lock record with `created_at = now`
    async fn insert(&self, new_lock: NewSeatLock) -> Result<SeatLock>;

    /// Find the earliest record for a natural key
    async fn find_by_key(&self, schedule_hash: &str, seat_id: i64) -> Result<Option<SeatLock>>;

    /// Every record currently in the given status, ordered by identity
    async fn find_by_status(&self, status: LockStatus) -> Result<Vec<SeatLock>>;

    /// Promote records matching the key to PAID; returns records affected
    async fn mark_paid(&self, schedule_hash: &str, seat_id: i64) -> Result<u64>;

    /// Attach a booking reference to records matching the key; returns records affected
    async fn attach_booking(
        &self,
        schedule_hash: &str,
        seat_id: i64,
        booking_id: i64,
    ) -> Result<u64>;

    /// Delete records matching the key; returns records affected
    async fn delete_by_key(&self, schedule_hash: &str, seat_id: i64) -> Result<u64>;

    /// UNPAID records created at or before the cutoff, oldest first
    async fn find_expired_unpaid(&self, cutoff: NaiveDateTime) -> Result<Vec<SeatLock>>;

    /// Provider health probe
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for diagnostics
    fn provider_name(&self) -> &'static str;
}
