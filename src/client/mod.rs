//! # HTTP Clients
//!
//! Outbound HTTP integration with neighboring services.

pub mod booking_client;

pub use booking_client::{BookingApiClient, BookingApiConfig, BookingTimeoutRequest};
