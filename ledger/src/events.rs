//! Domain events published by the ledger.
//!
//! Each lifecycle transition produces exactly one event. The aggregator
//! consumes these payloads and nothing else: it never reads ticket records
//! directly.

use serde::{Deserialize, Serialize};

use crate::types::{EntryType, GenderBreakdown, PrCode, Ticket, TicketId, TicketType};

/// A ticket entered the ledger in `Issued` state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedEvent {
    /// The issued ticket
    pub ticket_id: TicketId,
    /// Ticket tier
    pub ticket_type: TicketType,
    /// Entry lane
    pub entry_type: EntryType,
    /// Promoter attribution, if any
    pub pr_code: Option<PrCode>,
}

impl From<&Ticket> for IssuedEvent {
    fn from(ticket: &Ticket) -> Self {
        Self {
            ticket_id: ticket.id,
            ticket_type: ticket.ticket_type,
            entry_type: ticket.entry_type,
            pr_code: ticket.pr_code.clone(),
        }
    }
}

/// A ticket transitioned to its terminal `CheckedIn` state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckedInEvent {
    /// The checked-in ticket
    pub ticket_id: TicketId,
    /// Number of guests admitted
    pub group_size: u32,
    /// Gender breakdown of the group
    pub gender: GenderBreakdown,
    /// Whether the group is a couple
    pub is_couple: bool,
    /// Hour of day (UTC, 0..=23) the check-in happened
    pub hour_of_day: u32,
}

impl CheckedInEvent {
    /// Build the event from a checked-in ticket and its check-in hour
    #[must_use]
    pub fn new(ticket: &Ticket, hour_of_day: u32) -> Self {
        Self {
            ticket_id: ticket.id,
            group_size: ticket.group_size,
            gender: ticket.gender,
            is_couple: ticket.is_couple,
            hour_of_day,
        }
    }
}

/// Sum type over all ledger domain events
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// A ticket was issued
    Issued(IssuedEvent),
    /// A ticket was checked in
    CheckedIn(CheckedInEvent),
}

impl LedgerEvent {
    /// The ticket this event belongs to
    #[must_use]
    pub const fn ticket_id(&self) -> TicketId {
        match self {
            Self::Issued(e) => e.ticket_id,
            Self::CheckedIn(e) => e.ticket_id,
        }
    }
}
