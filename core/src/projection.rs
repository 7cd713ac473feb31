//! Projection system for building and maintaining read models from events.
//!
//! Projections are the query side of the system. The ledger handles the
//! write side (commands → events → state); projections consume those events
//! and maintain denormalized views optimized for queries.
//!
//! # Philosophy
//!
//! - **Eventually consistent**: projections may lag in-flight events
//! - **Optimized for reads**: shaped for query patterns, not writes
//! - **Rebuildable**: can be cleared and rebuilt from events at any time
//!
//! # Example
//!
//! ```ignore
//! struct CheckinCounters {
//!     counters: Arc<dyn CounterStore>,
//! }
//!
//! impl Projection for CheckinCounters {
//!     type Event = LedgerEvent;
//!
//!     fn name(&self) -> &str {
//!         "checkin_counters"
//!     }
//!
//!     async fn apply_event(&self, event: &Self::Event) -> Result<()> {
//!         // Update the counter store
//!         Ok(())
//!     }
//! }
//! ```

use std::future::Future;

/// Error type for projection operations.
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Event processing error
    #[error("Event processing error: {0}")]
    EventProcessing(String),

    /// Generic error
    #[error("Projection error: {0}")]
    Other(String),
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;

/// A projection builds and maintains a read model from domain events.
pub trait Projection: Send + Sync {
    /// The event type this projection listens to.
    type Event: Send + Sync;

    /// Get the projection name (used for identification and logging).
    ///
    /// Should be unique across all projections in the system.
    fn name(&self) -> &str;

    /// Apply an event to update the projection.
    ///
    /// Called once for each domain event. The projection extracts the
    /// relevant data and updates its storage as a single atomic unit: a
    /// reader must never observe a partially-applied event.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError`] if event processing or storage fails.
    fn apply_event(&self, event: &Self::Event) -> impl Future<Output = Result<()>> + Send;

    /// Rebuild the projection from scratch (optional).
    ///
    /// Drops current projection data in preparation for a full replay of
    /// all events. Default implementation is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError`] if the rebuild fails.
    fn rebuild(&self) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }
}
