//! Counter snapshot API endpoint (CQRS read side).
//!
//! - `GET /api/counters` - Point-in-time copy of every door counter

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::api::error::ApiError;
use crate::server::state::AppState;
use turnstile_aggregator::GenderRatio;

/// Counter snapshot response.
///
/// The raw `counters` map carries every derived key; the headline numbers
/// are lifted out for convenience.
#[derive(Debug, Serialize)]
pub struct CountersResponse {
    /// Total tickets issued
    pub total: u64,
    /// Guests currently inside
    pub current_occupancy: u64,
    /// Couples checked in
    pub couples_count: u64,
    /// Gender counts of checked-in guests
    pub gender_ratio: GenderRatio,
    /// Every counter, keyed by derived name
    pub counters: BTreeMap<String, u64>,
}

/// Get the current counter snapshot.
///
/// The snapshot is eventually consistent with in-flight events but never
/// reflects a partially-applied one.
///
/// # Errors
///
/// - 503 when the counter store is unavailable
pub async fn get_counters(
    State(state): State<AppState>,
) -> Result<Json<CountersResponse>, ApiError> {
    let snapshot = state.service.snapshot().await?;

    Ok(Json(CountersResponse {
        total: snapshot.total(),
        current_occupancy: snapshot.current_occupancy(),
        couples_count: snapshot.couples_count(),
        gender_ratio: snapshot.gender_ratio(),
        counters: snapshot.counters().clone(),
    }))
}
