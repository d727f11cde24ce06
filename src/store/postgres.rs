//! # PostgreSQL Lock Store
//!
//! Production store provider delegating to the [`SeatLock`] model queries.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{PgPool, Row};

use crate::error::Result;
use crate::models::{LockStatus, NewSeatLock, SeatLock};
use crate::store::LockStore;

/// PostgreSQL-backed lock store
#[derive(Debug, Clone)]
pub struct PgLockStore {
    pool: PgPool,
}

impl PgLockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LockStore for PgLockStore {
    async fn insert(&self, new_lock: NewSeatLock) -> Result<SeatLock> {
        Ok(SeatLock::create(&self.pool, new_lock).await?)
    }

    async fn find_by_key(&self, schedule_hash: &str, seat_id: i64) -> Result<Option<SeatLock>> {
        Ok(SeatLock::find_by_key(&self.pool, schedule_hash, seat_id).await?)
    }

    async fn find_by_status(&self, status: LockStatus) -> Result<Vec<SeatLock>> {
        Ok(SeatLock::find_by_status(&self.pool, status).await?)
    }

    async fn mark_paid(&self, schedule_hash: &str, seat_id: i64) -> Result<u64> {
        Ok(SeatLock::mark_paid(&self.pool, schedule_hash, seat_id).await?)
    }

    async fn attach_booking(
        &self,
        schedule_hash: &str,
        seat_id: i64,
        booking_id: i64,
    ) -> Result<u64> {
        Ok(SeatLock::attach_booking(&self.pool, schedule_hash, seat_id, booking_id).await?)
    }

    async fn delete_by_key(&self, schedule_hash: &str, seat_id: i64) -> Result<u64> {
        Ok(SeatLock::delete_by_key(&self.pool, schedule_hash, seat_id).await?)
    }

    async fn find_expired_unpaid(&self, cutoff: NaiveDateTime) -> Result<Vec<SeatLock>> {
        Ok(SeatLock::find_expired_unpaid(&self.pool, cutoff).await?)
    }

    async fn health_check(&self) -> Result<bool> {
        let row = sqlx::query("SELECT 1 as health")
            .fetch_one(&self.pool)
            .await?;

        let health: i32 = row.get("health");
        Ok(health == 1)
    }

    fn provider_name(&self) -> &'static str {
        "postgres"
    }
}
