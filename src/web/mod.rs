//! # Web API
//!
//! HTTP surface for the seat lock service: the fixed status ping other
//! services poll plus Kubernetes-style health probes. The actual lock
//! traffic never flows over HTTP; it arrives through the message bus.

pub mod handlers;
pub mod response_types;
pub mod routes;
pub mod state;

pub use response_types::{ApiError, ApiResult};
pub use state::AppState;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Create the Axum application with all routes and middleware
///
/// All routes are public. Request/response logging comes from the tower-http
/// trace layer so probe traffic shows up in the structured logs.
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .merge(routes::status_routes())
        .merge(routes::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
