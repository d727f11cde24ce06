//! # Database Operations
//!
//! Connection management and schema bootstrap for the seat lock store.
//!
//! ## Key Components
//!
//! - [`connection`] - Database connection management and pooling
//! - [`migrations`] - Idempotent startup schema bootstrap
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use seatlock_core::database::{DatabaseConnection, DatabaseMigrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DatabaseConnection::new().await?;
//! DatabaseMigrations::run_all(db.pool()).await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod migrations;

pub use connection::DatabaseConnection;
pub use migrations::DatabaseMigrations;
