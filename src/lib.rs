#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Seatlock Core Rust
//!
//! Event-driven seat lock state service keeping reservation state in sync
//! across the booking platform's services.
//!
//! ## Overview
//!
//! Seatlock Core owns the authoritative record of which seats are locked for
//! which schedule, whether each lock has been paid, and which booking it
//! belongs to. Sibling services never write this state directly; they publish
//! domain events on a shared fanout exchange, and this service folds those
//! events into its store. Locks that age past the payment window are swept
//! out, the booking service is told about each timeout, and a cancellation
//! event is published so every other subscriber releases the seat too.
//!
//! ## Architecture
//!
//! All writes flow through a single **state actor** that drains an ordered
//! command inbox one command at a time, which removes read-modify-write races
//! without any locking in the store itself. Around the actor sit:
//!
//! - an **event consumer** translating bus messages into actor commands
//! - an **expiry sweeper** asking the actor for expired locks on an interval
//! - a **cancellation relay** deleting each expired lock, notifying the
//!   booking service, and publishing the cancellation event
//! - a small **HTTP surface** exposing status and health probes
//!
//! ## Module Organization
//!
//! - [`actor`] - State actor, command types, and typed channels
//! - [`client`] - HTTP client for booking timeout notifications
//! - [`config`] - Environment-driven service configuration
//! - [`constants`] - Wire protocol constants and operational defaults
//! - [`database`] - Connection management and schema bootstrap
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging initialization
//! - [`messaging`] - Event bus adapters, consumer, and cancellation relay
//! - [`models`] - Seat lock record types
//! - [`store`] - Persistence trait with PostgreSQL and in-memory providers
//! - [`sweeper`] - Interval-driven expiry sweeper
//! - [`web`] - Axum status and health endpoints
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seatlock_core::actor::{LockCommand, LockKey, StateActor};
//! use seatlock_core::store::InMemoryLockStore;
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio::sync::oneshot;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Wire an actor to a store and start draining commands
//! let store = Arc::new(InMemoryLockStore::new());
//! let (mut actor, command_tx) = StateActor::new(store, Duration::from_secs(420), 256);
//! actor.start().await?;
//!
//! // Lock a seat the way the bus consumer would
//! let (resp, rx) = oneshot::channel();
//! command_tx
//!     .send(LockCommand::Create {
//!         key: LockKey::new("2025-10-04T19:30", 14),
//!         resp,
//!     })
//!     .await?;
//! let lock = rx.await??;
//! println!("seat {} locked until paid or expired", lock.seat_id);
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! Unit tests run against the in-memory store and bus; integration tests that
//! need PostgreSQL or RabbitMQ are marked `#[ignore]` with the service they
//! expect:
//!
//! ```bash
//! cargo test              # Unit tests
//! cargo test -- --ignored # Tests requiring live PostgreSQL/RabbitMQ
//! ```

pub mod actor;
pub mod client;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod store;
pub mod sweeper;
pub mod web;

pub use config::SeatLockConfig;
pub use constants::{defaults, message_types, LockStatus};
pub use database::{DatabaseConnection, DatabaseMigrations};
pub use error::{Result, SeatLockError};
pub use models::{NewSeatLock, SeatLock};
pub use store::{InMemoryLockStore, LockStore, PgLockStore};
