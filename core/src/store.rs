//! Durable store collaborator traits.
//!
//! The system delegates persistence to an external store behind small
//! traits: record-keeping for aggregates (defined next to the aggregate
//! that owns the records) and the counter surface defined here. Backends
//! implement these traits; everything else stays backend-agnostic.
//!
//! # Atomicity
//!
//! [`CounterStore::increment_many`] is the lost-update fix: all deltas for
//! one domain event commit as a single atomic batch, so a concurrent
//! reader never observes a partially-applied event and concurrent writers
//! never overwrite each other's base read.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors surfaced by store backends.
///
/// Only [`StoreError::Unavailable`] is transient; callers may retry it
/// with bounded backoff. Every other variant is a definitive answer about
/// the stored data and must not be retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record exists under the given id
    #[error("record '{id}' not found")]
    NotFound {
        /// The id that was looked up
        id: String,
    },

    /// A record already exists under the given id (conditional create lost)
    #[error("record '{id}' already exists")]
    AlreadyExists {
        /// The id that collided
        id: String,
    },

    /// A conditional update found the record in a state that forbids the
    /// transition (compare-and-set lost)
    #[error("conflict on record '{id}': {reason}")]
    Conflict {
        /// The id the update targeted
        id: String,
        /// Why the transition was refused
        reason: String,
    },

    /// The backend could not be reached or failed transiently
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether the error is transient and safe to retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A batch of counter deltas applied as one atomic unit.
///
/// Keys are derived counter names; deltas are non-negative (counters are
/// monotone accumulations — there is no decrement).
pub type CounterDeltas = Vec<(String, u64)>;

/// Atomic counter surface of the durable store.
///
/// Counters are string-keyed `u64` accumulators. Increments are atomic
/// relative to each other and to snapshots; a missing key reads as zero.
///
/// # Dyn Compatibility
///
/// Methods return explicit `Pin<Box<dyn Future>>` instead of `async fn`
/// to allow `Arc<dyn CounterStore>` in environments and projections.
pub trait CounterStore: Send + Sync {
    /// Atomically add `delta` to the counter under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails.
    fn increment(
        &self,
        key: &str,
        delta: u64,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Atomically apply a batch of deltas as one unit.
    ///
    /// Either every delta in the batch is visible to readers or none is.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails; on error
    /// no delta from the batch may remain applied.
    fn increment_many(
        &self,
        deltas: CounterDeltas,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Read a single counter. Missing keys read as zero.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails.
    fn get(&self, key: &str) -> Pin<Box<dyn Future<Output = Result<u64>> + Send + '_>>;

    /// Read a point-in-time copy of every counter.
    ///
    /// The copy is consistent: it never includes part of an
    /// [`increment_many`](CounterStore::increment_many) batch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the backend fails.
    fn snapshot(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<BTreeMap<String, u64>>> + Send + '_>>;
}

#[cfg(test)]
mod tests {
    use super::StoreError;

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(StoreError::Unavailable("timeout".into()).is_retryable());
        assert!(!StoreError::NotFound { id: "t-1".into() }.is_retryable());
        assert!(
            !StoreError::AlreadyExists { id: "t-1".into() }.is_retryable()
        );
        assert!(
            !StoreError::Conflict {
                id: "t-1".into(),
                reason: "already checked in".into()
            }
            .is_retryable()
        );
    }

    #[test]
    fn errors_render_their_ids() {
        let err = StoreError::NotFound { id: "t-42".into() };
        assert_eq!(err.to_string(), "record 't-42' not found");
    }
}
