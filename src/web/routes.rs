//! # Web API Routes
//!
//! Route definitions for the HTTP surface. Everything here is unauthenticated:
//! the service exposes only status and health probes.

use axum::routing::get;
use axum::Router;

use crate::web::handlers;
use crate::web::state::AppState;

/// Service status route
///
/// The fixed OK ping sibling services poll:
/// - GET /state-service/ - Process-is-up status payload
pub fn status_routes() -> Router<AppState> {
    Router::new().route("/state-service/", get(handlers::health::service_status))
}

/// Health check routes for monitoring and orchestration
///
/// Kubernetes-compatible probes:
/// - GET /health - Basic health check
/// - GET /health/ready - Readiness probe (checks collaborators)
/// - GET /health/live - Liveness probe
/// - GET /health/detailed - Detailed health information
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::basic_health))
        .route("/health/ready", get(handlers::health::readiness_probe))
        .route("/health/live", get(handlers::health::liveness_probe))
        .route("/health/detailed", get(handlers::health::detailed_health))
}
