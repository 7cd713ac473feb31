//! Health check endpoints for the door service.
//!
//! Provides endpoints for monitoring service health and readiness.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::server::state::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall status (`healthy`, `degraded`, `unhealthy`)
    pub status: String,
    /// Service version
    pub version: String,
    /// Per-component checks
    pub checks: Vec<ComponentHealth>,
}

/// Health of one component.
#[derive(Serialize)]
pub struct ComponentHealth {
    /// Component name
    pub component: String,
    /// Component status
    pub status: String,
    /// Detail message, if any
    pub message: Option<String>,
}

/// Health check endpoint.
///
/// Returns 200 while the service is healthy or degraded and 503 once a
/// component is unhealthy (e.g., a full dead letter queue).
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"0.1.0","checks":[...]}
/// ```
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let report = state.service.health();

    let status = if report.status.is_unhealthy() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status,
        Json(HealthResponse {
            status: report.status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: report
                .checks
                .into_iter()
                .map(|check| ComponentHealth {
                    component: check.component,
                    status: check.status.to_string(),
                    message: check.message,
                })
                .collect(),
        }),
    )
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,
}

/// Readiness check endpoint.
///
/// Returns 200 OK once the service is wired and accepting traffic. The
/// backing stores are in-process, so readiness follows liveness.
pub async fn readiness_check() -> (StatusCode, Json<ReadinessResponse>) {
    (StatusCode::OK, Json(ReadinessResponse { ready: true }))
}
