//! Application state for the door service HTTP server.

use std::sync::Arc;

use crate::app::DoorService;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via `Arc`) for each request.
#[derive(Clone)]
pub struct AppState {
    /// The door service: ledger + counters behind the three entry points
    pub service: Arc<DoorService>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub const fn new(service: Arc<DoorService>) -> Self {
        Self { service }
    }
}
