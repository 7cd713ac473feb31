//! The door service: entry points over the ledger and the counters.
//!
//! `DoorService` coordinates the store runtime, the record store, and the
//! counter aggregator:
//! 1. Commands go through `Store::send_and_wait_for`, correlated by ticket
//!    id, so every request resolves to its own terminal event.
//! 2. On success the resulting domain event is applied to the counter
//!    aggregator, exactly once per lifecycle event.
//! 3. Counter batches that exhaust their retry budget land in a dead
//!    letter queue for operator replay and surface as errors.
//!
//! The presentation layer consumes [`DoorService::issue`],
//! [`DoorService::check_in`], and [`DoorService::snapshot`] as its only
//! entry points.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use turnstile_aggregator::{CounterAggregator, CounterSnapshot};
use turnstile_core::environment::Clock;
use turnstile_core::projection::Projection;
use turnstile_core::store::CounterStore;
use turnstile_ledger::{
    CheckedInEvent, IssuedEvent, LedgerAction, LedgerEnvironment, LedgerError, LedgerEvent,
    LedgerReducer, LedgerState, StaffId, Ticket, TicketDraft, TicketId, TicketStore,
};
use turnstile_runtime::{DeadLetterQueue, HealthCheck, HealthReport, Store, StoreConfig};

use crate::config::Config;

/// Per-request failures of the door service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The ledger rejected the request
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The counter store stayed unavailable past the retry budget; the
    /// event was dead-lettered for replay
    #[error("counter aggregation failed: {0}")]
    Aggregation(String),

    /// The request did not resolve within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// The service is shutting down and not accepting requests
    #[error("service is shutting down")]
    Unavailable,

    /// A bug: the request resolved to an event for another operation
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    fn from_runtime(err: turnstile_runtime::StoreError) -> Self {
        use turnstile_runtime::StoreError;
        match err {
            StoreError::Timeout => Self::Timeout,
            StoreError::ShutdownInProgress | StoreError::ChannelClosed => Self::Unavailable,
            StoreError::ShutdownTimeout(pending) => {
                Self::Internal(format!("shutdown left {pending} effects running"))
            },
        }
    }
}

/// The door service
///
/// Wires the ledger store runtime, the counter aggregator, and the dead
/// letter queue behind the three public entry points.
pub struct DoorService {
    store: Store<LedgerState, LedgerAction, LedgerEnvironment, LedgerReducer>,
    aggregator: CounterAggregator,
    dead_letters: DeadLetterQueue<LedgerEvent>,
    request_timeout: Duration,
    retry_budget: usize,
}

impl DoorService {
    /// Create a service over the given store backends
    ///
    /// Uses the system clock; tests inject a fixed clock via
    /// [`DoorService::with_clock`].
    #[must_use]
    pub fn new(
        tickets: Arc<dyn TicketStore>,
        counters: Arc<dyn CounterStore>,
        config: &Config,
    ) -> Self {
        Self::with_clock(
            Arc::new(turnstile_core::environment::SystemClock),
            tickets,
            counters,
            config,
        )
    }

    /// Create a service with an injected clock
    #[must_use]
    pub fn with_clock(
        clock: Arc<dyn Clock>,
        tickets: Arc<dyn TicketStore>,
        counters: Arc<dyn CounterStore>,
        config: &Config,
    ) -> Self {
        let retry = config.retry.policy();
        let env = LedgerEnvironment::new(clock, tickets).with_retry_policy(retry.clone());
        let store_config = StoreConfig::default()
            .with_dlq_max_size(config.store.dlq_max_size)
            .with_broadcast_capacity(config.store.broadcast_capacity);

        Self {
            store: Store::with_config(LedgerState::new(), LedgerReducer::new(), env, store_config),
            aggregator: CounterAggregator::new(counters).with_retry_policy(retry),
            dead_letters: DeadLetterQueue::new(config.store.dlq_max_size),
            request_timeout: config.request_timeout(),
            retry_budget: config.retry.max_retries,
        }
    }

    /// Issue a ticket
    ///
    /// Validates the draft, records the ticket durably, and applies the
    /// issuance counters. Returns the issued ticket.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Ledger`] when validation fails or the id is taken
    /// - [`ServiceError::Aggregation`] when counters cannot be applied
    /// - [`ServiceError::Timeout`] / [`ServiceError::Unavailable`] on
    ///   runtime failures
    pub async fn issue(&self, draft: TicketDraft) -> Result<Ticket, ServiceError> {
        let ticket_id = TicketId::new();
        let outcome = self
            .store
            .send_and_wait_for(
                LedgerAction::IssueTicket { ticket_id, draft },
                move |action| action.is_terminal() && action.ticket_id() == ticket_id,
                self.request_timeout,
            )
            .await
            .map_err(ServiceError::from_runtime)?;

        match outcome {
            LedgerAction::TicketIssued { ticket } => {
                metrics::counter!(
                    "door_tickets_issued_total",
                    "ticket_type" => ticket.ticket_type.as_str()
                )
                .increment(1);
                tracing::info!(
                    ticket_id = %ticket.id,
                    ticket_type = %ticket.ticket_type,
                    group_size = ticket.group_size,
                    "Ticket issued"
                );

                self.dispatch(LedgerEvent::Issued(IssuedEvent::from(&ticket)))
                    .await?;
                Ok(ticket)
            },
            LedgerAction::IssueRejected { error, .. } => Err(ServiceError::Ledger(error)),
            other => Err(ServiceError::Internal(format!(
                "unexpected terminal action for issue: {other:?}"
            ))),
        }
    }

    /// Check a ticket in at the door
    ///
    /// Transitions the ticket to its terminal state (at most once) and
    /// applies the check-in counters. Returns the checked-in ticket.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Ledger`] with
    ///   [`LedgerError::AlreadyCheckedIn`] on duplicate check-in — always
    ///   reported, never silently absorbed — or
    ///   [`LedgerError::NotFound`] for unknown ids
    /// - [`ServiceError::Aggregation`] when counters cannot be applied
    /// - [`ServiceError::Timeout`] / [`ServiceError::Unavailable`] on
    ///   runtime failures
    pub async fn check_in(
        &self,
        ticket_id: TicketId,
        staff_id: StaffId,
    ) -> Result<Ticket, ServiceError> {
        let outcome = self
            .store
            .send_and_wait_for(
                LedgerAction::CheckInTicket {
                    ticket_id,
                    staff_id,
                },
                move |action| action.is_terminal() && action.ticket_id() == ticket_id,
                self.request_timeout,
            )
            .await
            .map_err(ServiceError::from_runtime)?;

        match outcome {
            LedgerAction::TicketCheckedIn {
                ticket,
                hour_of_day,
            } => {
                metrics::counter!("door_checkins_total").increment(1);
                metrics::counter!("door_guests_admitted_total")
                    .increment(u64::from(ticket.group_size));
                tracing::info!(
                    ticket_id = %ticket.id,
                    group_size = ticket.group_size,
                    hour_of_day,
                    "Ticket checked in"
                );

                self.dispatch(LedgerEvent::CheckedIn(CheckedInEvent::new(
                    &ticket,
                    hour_of_day,
                )))
                .await?;
                Ok(ticket)
            },
            LedgerAction::CheckInRejected { error, .. } => {
                metrics::counter!("door_checkin_rejections_total").increment(1);
                Err(ServiceError::Ledger(error))
            },
            other => Err(ServiceError::Internal(format!(
                "unexpected terminal action for check-in: {other:?}"
            ))),
        }
    }

    /// Read a point-in-time snapshot of every counter
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Aggregation`] when the counter store stays
    /// unavailable past the retry budget.
    pub async fn snapshot(&self) -> Result<CounterSnapshot, ServiceError> {
        self.aggregator
            .snapshot()
            .await
            .map_err(|err| ServiceError::Aggregation(err.to_string()))
    }

    /// Look up a ticket by id
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] when no such ticket exists.
    pub async fn ticket(&self, ticket_id: TicketId) -> Result<Ticket, ServiceError> {
        self.store
            .state(|state| state.get(&ticket_id).cloned())
            .await
            .ok_or_else(|| ServiceError::Ledger(LedgerError::NotFound(ticket_id)))
    }

    /// Apply a domain event to the counters, dead-lettering on exhaustion
    async fn dispatch(&self, event: LedgerEvent) -> Result<(), ServiceError> {
        if let Err(err) = self.aggregator.apply_event(&event).await {
            metrics::counter!("door_counter_updates_failed_total").increment(1);
            tracing::error!(
                ticket_id = %event.ticket_id(),
                error = %err,
                "Counter update exhausted retries, dead-lettering event"
            );
            self.dead_letters
                .push(event, err.to_string(), self.retry_budget);
            return Err(ServiceError::Aggregation(err.to_string()));
        }
        Ok(())
    }

    /// Events whose counter updates exhausted retries, for replay
    #[must_use]
    pub fn dead_letters(&self) -> DeadLetterQueue<LedgerEvent> {
        self.dead_letters.clone()
    }

    /// Aggregate health over the store runtime and the aggregation DLQ
    #[must_use]
    pub fn health(&self) -> HealthReport {
        let mut checks = vec![self.store.health()];

        let dead = self.dead_letters.len();
        let check = if dead == 0 {
            HealthCheck::healthy("aggregation")
        } else {
            HealthCheck::degraded(
                "aggregation",
                format!("{dead} events awaiting counter replay"),
            )
        }
        .with_metadata("dead_letters", dead.to_string());
        checks.push(check);

        HealthReport::new(checks)
    }

    /// Gracefully shut down the store runtime
    ///
    /// # Errors
    ///
    /// Returns [`turnstile_runtime::StoreError::ShutdownTimeout`] if
    /// pending effects outlive the timeout.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), turnstile_runtime::StoreError> {
        self.store.shutdown(timeout).await
    }
}
