//! # Schema Bootstrap
//!
//! Creates the seat lock schema at startup so the service can run against a
//! fresh database without an external migration step. All statements are
//! idempotent and safe to run on every boot.

use sqlx::PgPool;

/// Manages the seat lock schema.
pub struct DatabaseMigrations;

impl DatabaseMigrations {
    /// Create the seat_locks table and its lookup indexes if missing
    pub async fn run_all(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(
            r#"
            CREATE TABLE IF NOT EXISTS seat_locks (
                id BIGSERIAL PRIMARY KEY,
                schedule_hash VARCHAR NOT NULL,
                seat_id BIGINT NOT NULL,
                booking_id BIGINT,
                status VARCHAR(16) NOT NULL,
                created_at TIMESTAMP WITHOUT TIME ZONE NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMP WITHOUT TIME ZONE NOT NULL DEFAULT NOW()
            );

            CREATE INDEX IF NOT EXISTS idx_seat_locks_schedule_seat
                ON seat_locks (schedule_hash, seat_id);

            CREATE INDEX IF NOT EXISTS idx_seat_locks_status_created
                ON seat_locks (status, created_at);
        "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
