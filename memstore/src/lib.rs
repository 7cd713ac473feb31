//! # Turnstile Memstore
//!
//! In-memory implementations of the durable store collaborator:
//! [`MemoryTicketStore`] for ticket records and [`MemoryCounterStore`] for
//! the counter surface.
//!
//! Both are `RwLock<map>` based and safe for concurrent access. The
//! counter store applies [`increment_many`](turnstile_core::store::CounterStore::increment_many)
//! batches under a single write lock, so a snapshot never observes a
//! partially-applied event and concurrent batches cannot overwrite each
//! other's base read (no lost updates).

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, hash_map::Entry};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};
use turnstile_core::store::{CounterDeltas, CounterStore, Result, StoreError};
use turnstile_ledger::{StaffId, Ticket, TicketId, TicketStatus, TicketStore};

/// In-memory ticket record store.
///
/// # Example
///
/// ```
/// use turnstile_memstore::MemoryTicketStore;
///
/// let store = MemoryTicketStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryTicketStore {
    tickets: Arc<RwLock<HashMap<TicketId, Ticket>>>,
}

impl MemoryTicketStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tickets
    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all tickets (for test isolation)
    pub fn clear(&self) {
        self.tickets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl TicketStore for MemoryTicketStore {
    fn create(&self, ticket: Ticket) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut tickets = self.tickets.write().unwrap_or_else(PoisonError::into_inner);
            match tickets.entry(ticket.id) {
                Entry::Occupied(_) => Err(StoreError::AlreadyExists {
                    id: ticket.id.to_string(),
                }),
                Entry::Vacant(slot) => {
                    slot.insert(ticket);
                    Ok(())
                },
            }
        })
    }

    fn get(&self, id: TicketId) -> Pin<Box<dyn Future<Output = Result<Ticket>> + Send + '_>> {
        Box::pin(async move {
            self.tickets
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
        })
    }

    fn check_in(
        &self,
        id: TicketId,
        staff: StaffId,
        at: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<Ticket>> + Send + '_>> {
        Box::pin(async move {
            let mut tickets = self.tickets.write().unwrap_or_else(PoisonError::into_inner);
            let ticket = tickets
                .get_mut(&id)
                .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

            // Compare-and-set: the transition applies only from `Issued`
            match ticket.status {
                TicketStatus::Issued => {
                    ticket.status = TicketStatus::CheckedIn { at, staff };
                    Ok(ticket.clone())
                },
                TicketStatus::CheckedIn { .. } => Err(StoreError::Conflict {
                    id: id.to_string(),
                    reason: "already checked in".to_string(),
                }),
            }
        })
    }
}

/// In-memory counter store with atomic batched increments.
///
/// # Example
///
/// ```
/// use turnstile_core::store::CounterStore;
/// use turnstile_memstore::MemoryCounterStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryCounterStore::new();
/// store.increment("total", 1).await?;
/// assert_eq!(store.get("total").await?, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryCounterStore {
    counters: Arc<RwLock<BTreeMap<String, u64>>>,
}

impl MemoryCounterStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct counter keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no counter has been touched yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reset all counters (for test isolation)
    pub fn clear(&self) {
        self.counters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl CounterStore for MemoryCounterStore {
    fn increment(
        &self,
        key: &str,
        delta: u64,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            let mut counters = self
                .counters
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let slot = counters.entry(key).or_insert(0);
            *slot = slot.saturating_add(delta);
            Ok(())
        })
    }

    fn increment_many(
        &self,
        deltas: CounterDeltas,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            // One write lock for the whole batch: readers see all of the
            // event's deltas or none of them
            let mut counters = self
                .counters
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            for (key, delta) in deltas {
                let slot = counters.entry(key).or_insert(0);
                *slot = slot.saturating_add(delta);
            }
            Ok(())
        })
    }

    fn get(&self, key: &str) -> Pin<Box<dyn Future<Output = Result<u64>> + Send + '_>> {
        let key = key.to_string();
        Box::pin(async move {
            Ok(self
                .counters
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(&key)
                .copied()
                .unwrap_or(0))
        })
    }

    fn snapshot(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<BTreeMap<String, u64>>> + Send + '_>> {
        Box::pin(async move {
            Ok(self
                .counters
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone())
        })
    }
}
