//! # Expiry Sweeping
//!
//! Periodic collection of expired UNPAID locks. The sweeper owns the clock;
//! the state actor owns the store. Each tick issues one sweep command and
//! hands any expired records to the outbound relay for cancellation.

pub mod expiry_sweeper;

pub use expiry_sweeper::{ExpirySweeper, ExpirySweeperConfig, ExpirySweeperStats};
