//! # Turnstile Ledger
//!
//! The ticket ledger aggregate: issuance, at-most-once check-in, and the
//! domain events the counter aggregator consumes.
//!
//! ## State machine
//!
//! ```text
//! Issued ──check_in──▶ CheckedIn (terminal)
//! ```
//!
//! One forward transition, no reversal. Check-in fields (timestamp, staff)
//! are unset until the transition and immutable afterward.
//!
//! ## Flow
//!
//! Commands are validated by the reducer against in-memory state, records
//! are persisted through the [`store::TicketStore`] collaborator from
//! effects (conditional create / compare-and-set check-in, transient
//! failures retried with bounded backoff), and the resulting events feed
//! back to mutate state. The ledger owns ticket records exclusively and
//! never computes aggregates.

pub mod aggregate;
pub mod events;
pub mod store;
pub mod types;

pub use aggregate::{
    LedgerAction, LedgerEnvironment, LedgerError, LedgerReducer, ValidationError,
};
pub use events::{CheckedInEvent, IssuedEvent, LedgerEvent};
pub use store::TicketStore;
pub use types::{
    EntryType, GenderBreakdown, GuestId, LedgerState, Money, PrCode, StaffId, Ticket, TicketDraft,
    TicketId, TicketStatus, TicketType,
};
