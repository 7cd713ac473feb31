//! The counter aggregation projection.
//!
//! Consumes ledger domain events and maintains the derived counters:
//! per-tier and per-lane issuance, promoter attribution, totals, hourly
//! check-ins, gender ratio, occupancy, and couple counts.
//!
//! Each event maps to one batch of deltas that the counter store commits
//! atomically, so counters are applied exactly once per lifecycle event
//! and a snapshot never reflects half an event. Transient store failures
//! are retried with bounded backoff; every other failure surfaces
//! immediately.

use std::sync::Arc;
use turnstile_core::projection::{Projection, ProjectionError, Result};
use turnstile_core::store::{CounterDeltas, CounterStore, StoreError};
use turnstile_ledger::{CheckedInEvent, IssuedEvent, LedgerEvent};
use turnstile_runtime::retry::{RetryPolicy, retry_with_predicate};

use crate::keys;
use crate::snapshot::CounterSnapshot;

/// Projection maintaining the real-time door counters.
///
/// Owns the counter store exclusively. It reads ticket event payloads and
/// never ticket records.
///
/// # Query Examples
///
/// ```rust,ignore
/// let snapshot = aggregator.snapshot().await?;
/// println!("inside right now: {}", snapshot.current_occupancy());
/// println!("VIP issued: {}", snapshot.ticket_type(TicketType::Vip));
/// ```
#[derive(Clone)]
pub struct CounterAggregator {
    counters: Arc<dyn CounterStore>,
    retry: RetryPolicy,
}

impl CounterAggregator {
    /// Creates a new aggregator over the given counter store with the
    /// default retry policy
    #[must_use]
    pub fn new(counters: Arc<dyn CounterStore>) -> Self {
        Self {
            counters,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Deltas for a ticket issuance
    ///
    /// Tickets without a PR code produce no promoter delta.
    fn issued_deltas(event: &IssuedEvent) -> CounterDeltas {
        let mut deltas = vec![
            (keys::ticket_type(event.ticket_type), 1),
            (keys::entry_type(event.entry_type), 1),
        ];
        if let Some(code) = &event.pr_code {
            deltas.push((keys::pr_code(code), 1));
        }
        deltas.push((keys::TOTAL.to_string(), 1));
        deltas
    }

    /// Deltas for a check-in
    ///
    /// Zero-valued gender counts are skipped so they never materialize
    /// empty keys.
    fn checked_in_deltas(event: &CheckedInEvent) -> CounterDeltas {
        let mut deltas = vec![
            (keys::CURRENT_OCCUPANCY.to_string(), u64::from(event.group_size)),
            (keys::hourly_checkins(event.hour_of_day), 1),
        ];
        for (key, count) in [
            (keys::GENDER_MALE, event.gender.male),
            (keys::GENDER_FEMALE, event.gender.female),
            (keys::GENDER_OTHER, event.gender.other),
        ] {
            if count > 0 {
                deltas.push((key.to_string(), u64::from(count)));
            }
        }
        if event.is_couple {
            deltas.push((keys::COUPLES_COUNT.to_string(), 1));
        }
        deltas
    }

    /// Apply an issuance event to the counters
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Storage`] when the counter store stays
    /// unavailable past the retry budget.
    pub async fn apply_issued(&self, event: &IssuedEvent) -> Result<()> {
        tracing::debug!(
            ticket_id = %event.ticket_id,
            ticket_type = %event.ticket_type,
            "Applying issuance to counters"
        );
        self.apply_deltas(Self::issued_deltas(event)).await
    }

    /// Apply a check-in event to the counters
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Storage`] when the counter store stays
    /// unavailable past the retry budget.
    pub async fn apply_checked_in(&self, event: &CheckedInEvent) -> Result<()> {
        tracing::debug!(
            ticket_id = %event.ticket_id,
            group_size = event.group_size,
            hour_of_day = event.hour_of_day,
            "Applying check-in to counters"
        );
        self.apply_deltas(Self::checked_in_deltas(event)).await
    }

    /// Read a point-in-time snapshot of every counter
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Storage`] when the counter store stays
    /// unavailable past the retry budget.
    pub async fn snapshot(&self) -> Result<CounterSnapshot> {
        let counters = retry_with_predicate(
            self.retry.clone(),
            || self.counters.snapshot(),
            StoreError::is_retryable,
        )
        .await
        .map_err(|err| ProjectionError::Storage(err.to_string()))?;

        Ok(CounterSnapshot::from(counters))
    }

    /// Commit one event's deltas as a single atomic batch
    async fn apply_deltas(&self, deltas: CounterDeltas) -> Result<()> {
        retry_with_predicate(
            self.retry.clone(),
            || self.counters.increment_many(deltas.clone()),
            StoreError::is_retryable,
        )
        .await
        .map_err(|err| ProjectionError::Storage(err.to_string()))
    }
}

impl Projection for CounterAggregator {
    type Event = LedgerEvent;

    fn name(&self) -> &str {
        "checkin_counters"
    }

    async fn apply_event(&self, event: &Self::Event) -> Result<()> {
        match event {
            LedgerEvent::Issued(issued) => self.apply_issued(issued).await,
            LedgerEvent::CheckedIn(checked_in) => self.apply_checked_in(checked_in).await,
        }
    }
}
