//! # In-Memory Lock Store
//!
//! Thread-safe in-memory store implementation for testing and development.
//!
//! Mirrors the PostgreSQL provider's visible behavior: duplicate natural keys
//! are allowed, key lookups resolve to the earliest record, and mutations
//! touch every record matching the key.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{LockStatus, NewSeatLock, SeatLock};
use crate::store::LockStore;

/// In-memory lock store for testing
#[derive(Debug)]
pub struct InMemoryLockStore {
    /// Record storage in insert order
    records: RwLock<Vec<SeatLock>>,
    /// Next record ID
    next_id: AtomicI64,
}

impl Default for InMemoryLockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLockStore {
    /// Create a new empty in-memory lock store
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Get the number of stored records (for testing)
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Snapshot all records in insert order (for testing)
    pub async fn all_records(&self) -> Vec<SeatLock> {
        self.records.read().await.clone()
    }

    /// Rewrite `created_at` for records matching the key (for expiry testing)
    ///
    /// Stands in for a simulated clock: tests backdate a record instead of
    /// waiting out the expiry threshold.
    pub async fn backdate_created_at(
        &self,
        schedule_hash: &str,
        seat_id: i64,
        created_at: NaiveDateTime,
    ) {
        let mut records = self.records.write().await;
        for record in records
            .iter_mut()
            .filter(|r| r.schedule_hash == schedule_hash && r.seat_id == seat_id)
        {
            record.created_at = created_at;
        }
    }

    /// Clear all records (for testing)
    pub async fn clear_all(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl LockStore for InMemoryLockStore {
    async fn insert(&self, new_lock: NewSeatLock) -> Result<SeatLock> {
        let mut records = self.records.write().await;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now().naive_utc();

        let record = SeatLock {
            id,
            schedule_hash: new_lock.schedule_hash,
            seat_id: new_lock.seat_id,
            booking_id: None,
            status: LockStatus::Unpaid.as_str().to_string(),
            created_at: now,
            updated_at: now,
        };

        records.push(record.clone());
        Ok(record)
    }

    async fn find_by_key(&self, schedule_hash: &str, seat_id: i64) -> Result<Option<SeatLock>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.schedule_hash == schedule_hash && r.seat_id == seat_id)
            .min_by_key(|r| r.id)
            .cloned())
    }

    async fn find_by_status(&self, status: LockStatus) -> Result<Vec<SeatLock>> {
        let records = self.records.read().await;
        let mut matching: Vec<SeatLock> = records
            .iter()
            .filter(|r| r.status == status.as_str())
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.id);
        Ok(matching)
    }

    async fn mark_paid(&self, schedule_hash: &str, seat_id: i64) -> Result<u64> {
        let mut records = self.records.write().await;
        let now = Utc::now().naive_utc();
        let mut affected = 0;

        for record in records
            .iter_mut()
            .filter(|r| r.schedule_hash == schedule_hash && r.seat_id == seat_id)
        {
            record.status = LockStatus::Paid.as_str().to_string();
            record.updated_at = now;
            affected += 1;
        }

        Ok(affected)
    }

    async fn attach_booking(
        &self,
        schedule_hash: &str,
        seat_id: i64,
        booking_id: i64,
    ) -> Result<u64> {
        let mut records = self.records.write().await;
        let now = Utc::now().naive_utc();
        let mut affected = 0;

        for record in records
            .iter_mut()
            .filter(|r| r.schedule_hash == schedule_hash && r.seat_id == seat_id)
        {
            record.booking_id = Some(booking_id);
            record.updated_at = now;
            affected += 1;
        }

        Ok(affected)
    }

    async fn delete_by_key(&self, schedule_hash: &str, seat_id: i64) -> Result<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !(r.schedule_hash == schedule_hash && r.seat_id == seat_id));
        Ok((before - records.len()) as u64)
    }

    async fn find_expired_unpaid(&self, cutoff: NaiveDateTime) -> Result<Vec<SeatLock>> {
        let records = self.records.read().await;
        let mut expired: Vec<SeatLock> = records
            .iter()
            .filter(|r| r.status == LockStatus::Unpaid.as_str() && r.created_at <= cutoff)
            .cloned()
            .collect();
        expired.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(expired)
    }

    async fn health_check(&self) -> Result<bool> {
        // In-memory store is always healthy
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "in_memory"
    }
}
