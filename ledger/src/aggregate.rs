//! Ticket ledger aggregate: actions, errors, environment, and reducer.
//!
//! The reducer is the single place business rules live. Commands are
//! validated against in-memory state, persistence happens through effects
//! against the record store, and the resulting domain events are fed back
//! as actions that mutate state. The at-most-once check-in guarantee is
//! enforced twice: a fast-fail here when state already shows the terminal
//! status, and the record store's compare-and-set transition under races.

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use turnstile_core::store::StoreError;
use turnstile_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec};
use turnstile_runtime::retry::{RetryPolicy, retry_with_predicate};

use crate::store::TicketStore;
use crate::types::{LedgerState, StaffId, Ticket, TicketDraft, TicketId};

// ============================================================================
// Errors
// ============================================================================

/// Rejection reasons for malformed ticket drafts
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    /// No guest reference was supplied
    #[error("guest reference is required")]
    MissingGuest,

    /// No ticket type was supplied
    #[error("ticket type is required")]
    MissingTicketType,

    /// Group size must admit at least one guest
    #[error("group size must be at least 1")]
    ZeroGroupSize,

    /// Gender breakdown does not sum to the group size
    #[error("gender breakdown sums to {actual}, expected group size {expected}")]
    GenderMismatch {
        /// The declared group size
        expected: u32,
        /// What the breakdown actually sums to
        actual: u32,
    },
}

/// Per-request failures of ledger operations
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerError {
    /// The draft failed validation; the request was rejected unprocessed
    #[error("invalid ticket data: {0}")]
    Validation(#[from] ValidationError),

    /// No ticket exists under the given id
    #[error("ticket '{0}' not found")]
    NotFound(TicketId),

    /// A ticket already exists under the given id
    #[error("ticket '{0}' already issued")]
    AlreadyIssued(TicketId),

    /// The ticket is already in its terminal state
    ///
    /// Reported to the caller, never silently ignored: a duplicate
    /// check-in request is a client bug worth distinguishing from a
    /// legitimate retry.
    #[error("ticket '{0}' already checked in")]
    AlreadyCheckedIn(TicketId),

    /// The record store stayed unavailable past the retry budget
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl LedgerError {
    /// Map a store-level failure onto the ledger taxonomy
    #[must_use]
    pub fn from_store(id: TicketId, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound(id),
            StoreError::AlreadyExists { .. } => Self::AlreadyIssued(id),
            StoreError::Conflict { .. } => Self::AlreadyCheckedIn(id),
            StoreError::Unavailable(msg) => Self::StoreUnavailable(msg),
        }
    }
}

// ============================================================================
// Actions (Commands + Events)
// ============================================================================

/// Actions for the ticket ledger
///
/// Commands request a transition; events record one (or its rejection) and
/// are the only variants that mutate state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LedgerAction {
    // Commands
    /// Issue a new ticket
    IssueTicket {
        /// Id for the new ticket (caller-generated for idempotent retries)
        ticket_id: TicketId,
        /// The ticket data to validate and record
        draft: TicketDraft,
    },

    /// Check a ticket in at the door
    CheckInTicket {
        /// Ticket to transition
        ticket_id: TicketId,
        /// Staff member performing the check-in
        staff_id: StaffId,
    },

    // Events
    /// A ticket was issued and durably recorded
    TicketIssued {
        /// The ticket, in `Issued` state
        ticket: Ticket,
    },

    /// A ticket reached its terminal `CheckedIn` state
    TicketCheckedIn {
        /// The ticket, in `CheckedIn` state
        ticket: Ticket,
        /// Hour of day (UTC) the transition happened
        hour_of_day: u32,
    },

    /// Issuance was rejected
    IssueRejected {
        /// The ticket id the command targeted
        ticket_id: TicketId,
        /// Why the command was rejected
        error: LedgerError,
    },

    /// Check-in was rejected
    CheckInRejected {
        /// The ticket id the command targeted
        ticket_id: TicketId,
        /// Why the command was rejected
        error: LedgerError,
    },
}

impl LedgerAction {
    /// The ticket id this action concerns (correlation key)
    #[must_use]
    pub const fn ticket_id(&self) -> TicketId {
        match self {
            Self::IssueTicket { ticket_id, .. }
            | Self::CheckInTicket { ticket_id, .. }
            | Self::IssueRejected { ticket_id, .. }
            | Self::CheckInRejected { ticket_id, .. } => *ticket_id,
            Self::TicketIssued { ticket } | Self::TicketCheckedIn { ticket, .. } => ticket.id,
        }
    }

    /// Whether this action terminates a request (event, not command)
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::TicketIssued { .. }
                | Self::TicketCheckedIn { .. }
                | Self::IssueRejected { .. }
                | Self::CheckInRejected { .. }
        )
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the ledger
#[derive(Clone)]
pub struct LedgerEnvironment {
    /// Clock for issuance and check-in timestamps
    pub clock: Arc<dyn Clock>,
    /// Durable record store
    pub tickets: Arc<dyn TicketStore>,
    /// Retry policy for transient store failures
    pub retry: RetryPolicy,
}

impl LedgerEnvironment {
    /// Creates a new `LedgerEnvironment` with the default retry policy
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, tickets: Arc<dyn TicketStore>) -> Self {
        Self {
            clock,
            tickets,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the ticket ledger
#[derive(Clone, Copy, Debug, Default)]
pub struct LedgerReducer;

impl LedgerReducer {
    /// Creates a new `LedgerReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Single rejection effect for a failed issuance
    fn reject_issue(
        ticket_id: TicketId,
        error: LedgerError,
    ) -> SmallVec<[Effect<LedgerAction>; 4]> {
        smallvec![Effect::Future(Box::pin(async move {
            Some(LedgerAction::IssueRejected { ticket_id, error })
        }))]
    }

    /// Single rejection effect for a failed check-in
    fn reject_check_in(
        ticket_id: TicketId,
        error: LedgerError,
    ) -> SmallVec<[Effect<LedgerAction>; 4]> {
        smallvec![Effect::Future(Box::pin(async move {
            Some(LedgerAction::CheckInRejected { ticket_id, error })
        }))]
    }

    /// Applies an event to state
    fn apply_event(state: &mut LedgerState, action: &LedgerAction) {
        match action {
            LedgerAction::TicketIssued { ticket }
            | LedgerAction::TicketCheckedIn { ticket, .. } => {
                state.tickets.insert(ticket.id, ticket.clone());
                state.last_error = None;
            },

            LedgerAction::IssueRejected { error, .. }
            | LedgerAction::CheckInRejected { error, .. } => {
                state.last_error = Some(error.clone());
            },

            // Commands don't modify state
            LedgerAction::IssueTicket { .. } | LedgerAction::CheckInTicket { .. } => {},
        }
    }
}

impl Reducer for LedgerReducer {
    type State = LedgerState;
    type Action = LedgerAction;
    type Environment = LedgerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Issue ==========
            LedgerAction::IssueTicket { ticket_id, draft } => {
                if state.exists(&ticket_id) {
                    return Self::reject_issue(ticket_id, LedgerError::AlreadyIssued(ticket_id));
                }

                let ticket = match draft.build(ticket_id, env.clock.now()) {
                    Ok(ticket) => ticket,
                    Err(error) => return Self::reject_issue(ticket_id, error.into()),
                };

                // Persist through the conditional create; only transient
                // failures are retried
                let tickets = Arc::clone(&env.tickets);
                let retry = env.retry.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    let result = retry_with_predicate(
                        retry,
                        || tickets.create(ticket.clone()),
                        StoreError::is_retryable,
                    )
                    .await;

                    Some(match result {
                        Ok(()) => LedgerAction::TicketIssued { ticket },
                        Err(err) => LedgerAction::IssueRejected {
                            ticket_id,
                            error: LedgerError::from_store(ticket_id, err),
                        },
                    })
                }))]
            },

            // ========== Check-in ==========
            LedgerAction::CheckInTicket {
                ticket_id,
                staff_id,
            } => {
                // Fast-fail only on positive knowledge of the terminal
                // state; unknown ids still consult the store
                if state.get(&ticket_id).is_some_and(Ticket::is_checked_in) {
                    return Self::reject_check_in(
                        ticket_id,
                        LedgerError::AlreadyCheckedIn(ticket_id),
                    );
                }

                let at = env.clock.now();
                let hour_of_day = at.hour();

                let tickets = Arc::clone(&env.tickets);
                let retry = env.retry.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    let result = retry_with_predicate(
                        retry,
                        || tickets.check_in(ticket_id, staff_id.clone(), at),
                        StoreError::is_retryable,
                    )
                    .await;

                    Some(match result {
                        Ok(ticket) => LedgerAction::TicketCheckedIn {
                            ticket,
                            hour_of_day,
                        },
                        Err(err) => LedgerAction::CheckInRejected {
                            ticket_id,
                            error: LedgerError::from_store(ticket_id, err),
                        },
                    })
                }))]
            },

            // ========== Events ==========
            event => {
                Self::apply_event(state, &event);
                SmallVec::new()
            },
        }
    }
}
