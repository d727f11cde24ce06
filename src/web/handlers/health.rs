//! # Health Check Handlers
//!
//! Kubernetes-compatible health check endpoints for monitoring and load
//! balancing, plus the fixed status ping other services poll.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, error};

use crate::web::response_types::ApiError;
use crate::web::state::AppState;

/// Basic health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
}

/// Detailed health check response
#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: String,
    timestamp: String,
    checks: HashMap<String, HealthCheck>,
    info: HealthInfo,
}

/// Individual health check result
#[derive(Serialize)]
pub struct HealthCheck {
    status: String,
    message: Option<String>,
    duration_ms: u64,
}

/// System information for detailed health
#[derive(Serialize)]
pub struct HealthInfo {
    version: String,
    database_pool_size: u32,
    message_bus_provider: String,
}

/// Service status ping: GET /state-service/
///
/// Fixed OK payload polled by sibling services to confirm the process is up.
/// Touches no collaborators, so it stays responsive even when the store or
/// the bus is down.
pub async fn service_status() -> Json<&'static str> {
    debug!("Service status ping received");
    Json("OK")
}

/// Basic health check endpoint: GET /health
///
/// Simple health check that returns OK if the service is running.
/// This endpoint is always available, even during graceful shutdown.
pub async fn basic_health(_state: State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Kubernetes readiness probe: GET /health/ready
///
/// Indicates whether the service is ready to accept traffic.
/// Checks database and message bus connectivity.
pub async fn readiness_probe(
    State(state): State<AppState>,
) -> Result<Json<DetailedHealthResponse>, ApiError> {
    debug!("Performing readiness probe");

    let mut checks = HashMap::new();
    let mut overall_healthy = true;

    // Check database connectivity
    let db_check = check_database_health(&state.db_pool).await;
    overall_healthy = overall_healthy && db_check.status == "healthy";
    checks.insert("database".to_string(), db_check);

    // Check message bus connectivity
    let bus_check = check_bus_health(&state).await;
    overall_healthy = overall_healthy && bus_check.status == "healthy";
    checks.insert("message_bus".to_string(), bus_check);

    let response = DetailedHealthResponse {
        status: if overall_healthy {
            "ready"
        } else {
            "not_ready"
        }
        .to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        checks,
        info: create_health_info(&state),
    };

    if overall_healthy {
        Ok(Json(response))
    } else {
        Err(ApiError::ServiceUnavailable)
    }
}

/// Kubernetes liveness probe: GET /health/live
///
/// Indicates whether the service is alive and should not be restarted.
/// This is a simpler check than readiness - mainly checks if the process is responsive.
pub async fn liveness_probe(State(state): State<AppState>) -> Json<HealthResponse> {
    // Check if we can access our state (basic process health)
    let _pool_size = state.db_pool.size();

    Json(HealthResponse {
        status: "alive".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Detailed health status: GET /health/detailed
///
/// Comprehensive health check with detailed information about all collaborators.
/// Always returns 200; degraded subsystems are reported in the body.
pub async fn detailed_health(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    debug!("Performing detailed health check");

    let mut checks = HashMap::new();

    checks.insert(
        "database".to_string(),
        check_database_health(&state.db_pool).await,
    );
    checks.insert("message_bus".to_string(), check_bus_health(&state).await);

    let overall_healthy = checks.values().all(|check| check.status == "healthy");

    Json(DetailedHealthResponse {
        status: if overall_healthy {
            "healthy"
        } else {
            "degraded"
        }
        .to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        checks,
        info: create_health_info(&state),
    })
}

// Helper functions for health checks

async fn check_database_health(pool: &sqlx::PgPool) -> HealthCheck {
    let start = std::time::Instant::now();

    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthCheck {
            status: "healthy".to_string(),
            message: None,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => {
            error!(error = %e, "Database health check failed");
            HealthCheck {
                status: "unhealthy".to_string(),
                message: Some(format!("Database connection failed: {e}")),
                duration_ms: start.elapsed().as_millis() as u64,
            }
        }
    }
}

async fn check_bus_health(state: &AppState) -> HealthCheck {
    let start = std::time::Instant::now();

    match state.bus.health_check().await {
        Ok(true) => HealthCheck {
            status: "healthy".to_string(),
            message: None,
            duration_ms: start.elapsed().as_millis() as u64,
        },
        Ok(false) => HealthCheck {
            status: "unhealthy".to_string(),
            message: Some("Broker connection lost".to_string()),
            duration_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => {
            error!(error = %e, "Message bus health check failed");
            HealthCheck {
                status: "unhealthy".to_string(),
                message: Some(format!("Broker health check failed: {e}")),
                duration_ms: start.elapsed().as_millis() as u64,
            }
        }
    }
}

fn create_health_info(state: &AppState) -> HealthInfo {
    HealthInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        database_pool_size: state.db_pool.size(),
        message_bus_provider: state.bus.provider_name().to_string(),
    }
}
