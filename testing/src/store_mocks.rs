//! Flaky store doubles for exercising retry paths.
//!
//! Both wrappers delegate to a real backend and inject
//! [`StoreError::Unavailable`] for the first N operations, which lets
//! tests drive the bounded-backoff retry logic deterministically.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use turnstile_core::store::{CounterDeltas, CounterStore, Result, StoreError};
use turnstile_ledger::{StaffId, Ticket, TicketId, TicketStore};

fn injected_failure() -> StoreError {
    StoreError::Unavailable("injected failure".to_string())
}

/// Counter store that fails its first N operations.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use turnstile_core::store::CounterStore;
/// use turnstile_memstore::MemoryCounterStore;
/// use turnstile_testing::FlakyCounterStore;
///
/// # async fn example() {
/// let store = FlakyCounterStore::failing(Arc::new(MemoryCounterStore::new()), 1);
/// assert!(store.increment("total", 1).await.is_err()); // injected
/// assert!(store.increment("total", 1).await.is_ok());
/// # }
/// ```
pub struct FlakyCounterStore {
    inner: Arc<dyn CounterStore>,
    remaining_failures: AtomicUsize,
}

impl FlakyCounterStore {
    /// Wrap `inner`, failing the first `failures` operations
    #[must_use]
    pub fn failing(inner: Arc<dyn CounterStore>, failures: usize) -> Self {
        Self {
            inner,
            remaining_failures: AtomicUsize::new(failures),
        }
    }

    /// Consume one budgeted failure, if any remain
    fn should_fail(&self) -> bool {
        self.remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl CounterStore for FlakyCounterStore {
    fn increment(
        &self,
        key: &str,
        delta: u64,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        if self.should_fail() {
            return Box::pin(async { Err(injected_failure()) });
        }
        self.inner.increment(key, delta)
    }

    fn increment_many(
        &self,
        deltas: CounterDeltas,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        if self.should_fail() {
            return Box::pin(async { Err(injected_failure()) });
        }
        self.inner.increment_many(deltas)
    }

    fn get(&self, key: &str) -> Pin<Box<dyn Future<Output = Result<u64>> + Send + '_>> {
        if self.should_fail() {
            return Box::pin(async { Err(injected_failure()) });
        }
        self.inner.get(key)
    }

    fn snapshot(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<BTreeMap<String, u64>>> + Send + '_>> {
        if self.should_fail() {
            return Box::pin(async { Err(injected_failure()) });
        }
        self.inner.snapshot()
    }
}

/// Ticket store that fails its first N operations.
pub struct FlakyTicketStore {
    inner: Arc<dyn TicketStore>,
    remaining_failures: AtomicUsize,
}

impl FlakyTicketStore {
    /// Wrap `inner`, failing the first `failures` operations
    #[must_use]
    pub fn failing(inner: Arc<dyn TicketStore>, failures: usize) -> Self {
        Self {
            inner,
            remaining_failures: AtomicUsize::new(failures),
        }
    }

    /// Consume one budgeted failure, if any remain
    fn should_fail(&self) -> bool {
        self.remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl TicketStore for FlakyTicketStore {
    fn create(&self, ticket: Ticket) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        if self.should_fail() {
            return Box::pin(async { Err(injected_failure()) });
        }
        self.inner.create(ticket)
    }

    fn get(&self, id: TicketId) -> Pin<Box<dyn Future<Output = Result<Ticket>> + Send + '_>> {
        if self.should_fail() {
            return Box::pin(async { Err(injected_failure()) });
        }
        self.inner.get(id)
    }

    fn check_in(
        &self,
        id: TicketId,
        staff: StaffId,
        at: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<Ticket>> + Send + '_>> {
        if self.should_fail() {
            return Box::pin(async { Err(injected_failure()) });
        }
        self.inner.check_in(id, staff, at)
    }
}
