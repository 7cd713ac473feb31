//! Router configuration for the door service.
//!
//! Builds the complete Axum router with all endpoints.

use axum::{
    Router,
    routing::{get, post},
};

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{counters, tickets};

/// Build the complete Axum router.
///
/// Configures all routes:
/// - Health checks
/// - Ticket issuance and check-in (write side)
/// - Counter snapshot (read side)
///
/// # Arguments
///
/// - `state`: Application state to share with handlers
#[must_use]
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Ticket lifecycle (write side)
        .route("/tickets", post(tickets::issue_ticket))
        .route("/tickets/:id", get(tickets::get_ticket))
        .route("/tickets/:id/checkin", post(tickets::check_in_ticket))
        // Counter queries (CQRS read side)
        .route("/counters", get(counters::get_counters));

    Router::new()
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .with_state(state)
}
