//! # Web API Request Handlers
//!
//! Contains all HTTP request handlers organized by functional area.

pub mod health;
