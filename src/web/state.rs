//! # Web API Application State
//!
//! Defines the shared state for the HTTP endpoints: the database pool backing
//! the lock record store and a handle to the message bus, both consumed by the
//! health probes.

use crate::messaging::EventBus;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state for the HTTP endpoints
///
/// This state is shared across all request handlers. The pool is the same one
/// the lock store writes through, so a readiness failure here means the state
/// actor cannot reach storage either.
#[derive(Clone)]
pub struct AppState {
    /// Database pool backing the seat lock store
    pub db_pool: PgPool,

    /// Message bus handle, used for connectivity reporting
    pub bus: Arc<dyn EventBus>,
}

impl AppState {
    pub fn new(db_pool: PgPool, bus: Arc<dyn EventBus>) -> Self {
        Self { db_pool, bus }
    }
}
