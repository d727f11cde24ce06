//! # Seat Lock Model
//!
//! The single domain entity of the state service: one row per provisionally
//! locked seat, keyed by the (schedule_hash, seat_id) natural key.
//!
//! ## Database Schema
//!
//! Maps to the `seat_locks` table:
//! ```sql
//! CREATE TABLE seat_locks (
//!   id BIGSERIAL PRIMARY KEY,
//!   schedule_hash VARCHAR NOT NULL,
//!   seat_id BIGINT NOT NULL,
//!   booking_id BIGINT,
//!   status VARCHAR(16) NOT NULL,
//!   created_at TIMESTAMP WITHOUT TIME ZONE NOT NULL DEFAULT NOW(),
//!   updated_at TIMESTAMP WITHOUT TIME ZONE NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! No unique constraint is placed on the natural key; the state actor is the
//! only writer and key lookups order by `id` so duplicate inserts behave the
//! same as in the original deployment. `created_at` is immutable after insert
//! and is the sole input to expiry decisions.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::fmt;
use std::str::FromStr;

/// Payment status of a seat lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockStatus {
    /// Seat is locked but payment has not completed; subject to expiry
    Unpaid,
    /// Payment completed; the lock is permanent until explicitly cancelled
    Paid,
}

impl LockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LockStatus::Unpaid => "UNPAID",
            LockStatus::Paid => "PAID",
        }
    }

    /// Check if this status still carries expiry risk
    pub fn is_unpaid(&self) -> bool {
        matches!(self, LockStatus::Unpaid)
    }

    /// Check if this status is exempt from expiry
    pub fn is_paid(&self) -> bool {
        matches!(self, LockStatus::Paid)
    }
}

impl fmt::Display for LockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNPAID" => Ok(LockStatus::Unpaid),
            "PAID" => Ok(LockStatus::Paid),
            _ => Err(format!("Invalid lock status: {s}")),
        }
    }
}

/// A persisted seat lock record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SeatLock {
    /// Store-assigned identity
    pub id: i64,

    /// Reservation scope (schedule identifier), opaque to this service
    pub schedule_hash: String,

    /// Seat identifier within the scope
    pub seat_id: i64,

    /// External booking reference, absent until a booking is created
    pub booking_id: Option<i64>,

    /// "UNPAID" or "PAID"
    pub status: String,

    /// Insert time; immutable, drives expiry
    pub created_at: NaiveDateTime,

    /// Last mutation time; never consulted by expiry logic
    pub updated_at: NaiveDateTime,
}

/// New seat lock for creation (without generated fields)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSeatLock {
    pub schedule_hash: String,
    pub seat_id: i64,
}

impl SeatLock {
    /// Insert a new UNPAID lock record
    pub async fn create(pool: &PgPool, new_lock: NewSeatLock) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO seat_locks (schedule_hash, seat_id, status)
            VALUES ($1, $2, $3)
            RETURNING id, schedule_hash, seat_id, booking_id, status, created_at, updated_at
            "#,
        )
        .bind(new_lock.schedule_hash)
        .bind(new_lock.seat_id)
        .bind(LockStatus::Unpaid.as_str())
        .fetch_one(pool)
        .await
    }

    /// Find the earliest lock record for a natural key
    pub async fn find_by_key(
        pool: &PgPool,
        schedule_hash: &str,
        seat_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, schedule_hash, seat_id, booking_id, status, created_at, updated_at
            FROM seat_locks
            WHERE schedule_hash = $1 AND seat_id = $2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(schedule_hash)
        .bind(seat_id)
        .fetch_optional(pool)
        .await
    }

    /// Find every record currently in the given status, ordered by identity
    pub async fn find_by_status(
        pool: &PgPool,
        status: LockStatus,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, schedule_hash, seat_id, booking_id, status, created_at, updated_at
            FROM seat_locks
            WHERE status = $1
            ORDER BY id
            "#,
        )
        .bind(status.as_str())
        .fetch_all(pool)
        .await
    }

    /// Promote every record matching the key to PAID, returning rows affected
    pub async fn mark_paid(
        pool: &PgPool,
        schedule_hash: &str,
        seat_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE seat_locks
            SET status = $3, updated_at = NOW()
            WHERE schedule_hash = $1 AND seat_id = $2
            "#,
        )
        .bind(schedule_hash)
        .bind(seat_id)
        .bind(LockStatus::Paid.as_str())
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Attach a booking reference to every record matching the key
    pub async fn attach_booking(
        pool: &PgPool,
        schedule_hash: &str,
        seat_id: i64,
        booking_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE seat_locks
            SET booking_id = $3, updated_at = NOW()
            WHERE schedule_hash = $1 AND seat_id = $2
            "#,
        )
        .bind(schedule_hash)
        .bind(seat_id)
        .bind(booking_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete every record matching the key, returning rows affected
    pub async fn delete_by_key(
        pool: &PgPool,
        schedule_hash: &str,
        seat_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM seat_locks
            WHERE schedule_hash = $1 AND seat_id = $2
            "#,
        )
        .bind(schedule_hash)
        .bind(seat_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Find UNPAID records created at or before the cutoff, oldest first
    pub async fn find_expired_unpaid(
        pool: &PgPool,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, schedule_hash, seat_id, booking_id, status, created_at, updated_at
            FROM seat_locks
            WHERE status = $1 AND created_at <= $2
            ORDER BY created_at, id
            "#,
        )
        .bind(LockStatus::Unpaid.as_str())
        .bind(cutoff)
        .fetch_all(pool)
        .await
    }

    /// Parse the stored status string
    pub fn lock_status(&self) -> Result<LockStatus, String> {
        self.status.parse()
    }
}
