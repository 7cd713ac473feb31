//! Domain types for the ticket ledger.
//!
//! This module contains the value objects and entities of the door:
//! identifiers, ticket tiers and entry types, the gender breakdown of a
//! group, the cents-based money wrapper, and the `Ticket` entity with its
//! two-state lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::aggregate::LedgerError;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random `TicketId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TicketId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to the guest a ticket belongs to
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuestId(String);

impl GuestId {
    /// Creates a new `GuestId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the guest reference as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the reference is empty (invalid)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the staff member performing a check-in
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffId(String);

impl StaffId {
    /// Creates a new `StaffId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the staff identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Promoter (PR) attribution code carried by a ticket
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrCode(String);

impl PrCode {
    /// Creates a new `PrCode`
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Ticket classification
// ============================================================================

/// Ticket tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    /// First pricing tier
    Tier1,
    /// Second pricing tier
    Tier2,
    /// VIP admission
    Vip,
    /// Guestlist admission
    Guestlist,
    /// Staff admission
    Staff,
}

impl TicketType {
    /// Stable lower-case slug, used for counter keys
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tier1 => "tier1",
            Self::Tier2 => "tier2",
            Self::Vip => "vip",
            Self::Guestlist => "guestlist",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the group enters the venue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Regular queue
    Standard,
    /// Express lane
    Express,
    /// Complimentary entry
    Comp,
}

impl EntryType {
    /// Stable lower-case slug, used for counter keys
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
            Self::Comp => "comp",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Gender breakdown of a group
///
/// The three counts must sum to the group size; the ledger rejects drafts
/// where they do not.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderBreakdown {
    /// Number of male guests in the group
    pub male: u32,
    /// Number of female guests in the group
    pub female: u32,
    /// Number of guests identifying otherwise
    pub other: u32,
}

impl GenderBreakdown {
    /// Creates a new breakdown
    #[must_use]
    pub const fn new(male: u32, female: u32, other: u32) -> Self {
        Self {
            male,
            female,
            other,
        }
    }

    /// Sum of all counts
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.male
            .saturating_add(self.female)
            .saturating_add(self.other)
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents money in cents to avoid floating-point arithmetic errors
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole currency units with overflow checking
    #[must_use]
    pub const fn checked_from_units(units: u64) -> Option<Self> {
        match units.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Ticket entity
// ============================================================================

/// Input for issuing a ticket
///
/// `guest` and `ticket_type` are optional at the edge so that presence can
/// be validated by the ledger rather than by callers; everything else has
/// a usable default shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TicketDraft {
    /// Guest the ticket belongs to (required)
    pub guest: Option<GuestId>,
    /// Ticket tier (required)
    pub ticket_type: Option<TicketType>,
    /// Entry lane
    pub entry_type: EntryType,
    /// Number of guests admitted on this ticket (must be >= 1)
    pub group_size: u32,
    /// Gender breakdown (must sum to `group_size`)
    pub gender: GenderBreakdown,
    /// Whether the group is a couple
    pub is_couple: bool,
    /// Cover charge collected at issuance
    pub cover_charge: Money,
    /// Opaque payment transaction reference
    pub payment_ref: Option<String>,
    /// Promoter attribution
    pub pr_code: Option<PrCode>,
}

impl TicketDraft {
    /// Validate the draft and build the `Issued` ticket
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`](crate::aggregate::ValidationError) when
    /// the guest reference or ticket type is absent, the group size is
    /// zero, or the gender breakdown does not sum to the group size.
    pub fn build(
        self,
        id: TicketId,
        issued_at: DateTime<Utc>,
    ) -> Result<Ticket, crate::aggregate::ValidationError> {
        use crate::aggregate::ValidationError;

        let guest = match self.guest {
            Some(guest) if !guest.is_empty() => guest,
            _ => return Err(ValidationError::MissingGuest),
        };
        let ticket_type = self
            .ticket_type
            .ok_or(ValidationError::MissingTicketType)?;
        if self.group_size == 0 {
            return Err(ValidationError::ZeroGroupSize);
        }
        if self.gender.total() != self.group_size {
            return Err(ValidationError::GenderMismatch {
                expected: self.group_size,
                actual: self.gender.total(),
            });
        }

        Ok(Ticket {
            id,
            guest,
            ticket_type,
            entry_type: self.entry_type,
            group_size: self.group_size,
            gender: self.gender,
            is_couple: self.is_couple,
            cover_charge: self.cover_charge,
            payment_ref: self.payment_ref,
            pr_code: self.pr_code,
            status: TicketStatus::Issued,
            issued_at,
        })
    }
}

/// Lifecycle state of a ticket
///
/// Single forward transition `Issued` → `CheckedIn`; `CheckedIn` is
/// terminal and carries the check-in timestamp and staff identifier, which
/// are immutable afterward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Issued, not yet at the door
    Issued,
    /// Checked in (terminal)
    CheckedIn {
        /// When the group was checked in
        at: DateTime<Utc>,
        /// Who checked the group in
        staff: StaffId,
    },
}

/// A single admission record tied to one guest
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique ticket identifier
    pub id: TicketId,
    /// Guest the ticket belongs to
    pub guest: GuestId,
    /// Ticket tier
    pub ticket_type: TicketType,
    /// Entry lane
    pub entry_type: EntryType,
    /// Number of guests admitted on this ticket
    pub group_size: u32,
    /// Gender breakdown of the group
    pub gender: GenderBreakdown,
    /// Whether the group is a couple
    pub is_couple: bool,
    /// Cover charge collected at issuance
    pub cover_charge: Money,
    /// Opaque payment transaction reference
    pub payment_ref: Option<String>,
    /// Promoter attribution
    pub pr_code: Option<PrCode>,
    /// Current lifecycle state
    pub status: TicketStatus,
    /// When the ticket was issued
    pub issued_at: DateTime<Utc>,
}

impl Ticket {
    /// Whether the ticket has reached its terminal state
    #[must_use]
    pub const fn is_checked_in(&self) -> bool {
        matches!(self.status, TicketStatus::CheckedIn { .. })
    }

    /// Returns a copy of this ticket transitioned to `CheckedIn`
    #[must_use]
    pub fn checked_in(mut self, staff: StaffId, at: DateTime<Utc>) -> Self {
        self.status = TicketStatus::CheckedIn { at, staff };
        self
    }
}

// ============================================================================
// Aggregate state
// ============================================================================

/// State for the ticket ledger aggregate
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerState {
    /// All tickets indexed by ID
    pub tickets: HashMap<TicketId, Ticket>,
    /// Last rejection, kept for observers
    pub last_error: Option<LedgerError>,
}

impl LedgerState {
    /// Creates a new empty `LedgerState`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a ticket by ID
    #[must_use]
    pub fn get(&self, id: &TicketId) -> Option<&Ticket> {
        self.tickets.get(id)
    }

    /// Checks if a ticket exists
    #[must_use]
    pub fn exists(&self, id: &TicketId) -> bool {
        self.tickets.contains_key(id)
    }

    /// Returns the number of tickets
    #[must_use]
    pub fn count(&self) -> usize {
        self.tickets.len()
    }

    /// Returns the number of checked-in tickets
    #[must_use]
    pub fn checked_in_count(&self) -> usize {
        self.tickets.values().filter(|t| t.is_checked_in()).count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> TicketDraft {
        TicketDraft {
            guest: Some(GuestId::new("guest-1")),
            ticket_type: Some(TicketType::Vip),
            entry_type: EntryType::Standard,
            group_size: 2,
            gender: GenderBreakdown::new(1, 1, 0),
            is_couple: true,
            cover_charge: Money::from_cents(5000),
            payment_ref: None,
            pr_code: Some(PrCode::new("anna")),
        }
    }

    #[test]
    fn build_produces_issued_ticket() {
        let id = TicketId::new();
        let now = Utc::now();
        let ticket = draft().build(id, now).unwrap();

        assert_eq!(ticket.id, id);
        assert_eq!(ticket.status, TicketStatus::Issued);
        assert_eq!(ticket.issued_at, now);
        assert!(!ticket.is_checked_in());
    }

    #[test]
    fn build_rejects_missing_guest() {
        let mut d = draft();
        d.guest = None;
        let err = d.build(TicketId::new(), Utc::now()).unwrap_err();
        assert_eq!(err, crate::aggregate::ValidationError::MissingGuest);
    }

    #[test]
    fn build_rejects_empty_guest_reference() {
        let mut d = draft();
        d.guest = Some(GuestId::new(""));
        let err = d.build(TicketId::new(), Utc::now()).unwrap_err();
        assert_eq!(err, crate::aggregate::ValidationError::MissingGuest);
    }

    #[test]
    fn build_rejects_gender_mismatch() {
        let mut d = draft();
        d.gender = GenderBreakdown::new(2, 1, 0);
        let err = d.build(TicketId::new(), Utc::now()).unwrap_err();
        assert_eq!(
            err,
            crate::aggregate::ValidationError::GenderMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn checked_in_records_staff_and_time() {
        let now = Utc::now();
        let ticket = draft().build(TicketId::new(), now).unwrap();
        let staff = StaffId::new("door-7");

        let ticket = ticket.checked_in(staff.clone(), now);
        assert!(ticket.is_checked_in());
        assert_eq!(
            ticket.status,
            TicketStatus::CheckedIn { at: now, staff }
        );
    }

    #[test]
    fn money_display_renders_cents() {
        assert_eq!(Money::from_cents(5025).to_string(), "$50.25");
        assert!(Money::from_cents(0).is_zero());
        assert_eq!(Money::checked_from_units(30).unwrap().cents(), 3000);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Validation accepts a draft exactly when the breakdown sums
            // to the group size
            #[test]
            fn gender_sum_governs_build(
                male in 0u32..5,
                female in 0u32..5,
                other in 0u32..5,
                group_size in 1u32..12,
            ) {
                let mut d = draft();
                d.group_size = group_size;
                d.gender = GenderBreakdown::new(male, female, other);

                let result = d.build(TicketId::new(), Utc::now());
                if male + female + other == group_size {
                    prop_assert!(result.is_ok());
                } else {
                    prop_assert_eq!(
                        result.unwrap_err(),
                        crate::aggregate::ValidationError::GenderMismatch {
                            expected: group_size,
                            actual: male + female + other,
                        }
                    );
                }
            }
        }
    }

    #[test]
    fn ledger_state_counts_checked_in() {
        let mut state = LedgerState::new();
        let now = Utc::now();
        let a = draft().build(TicketId::new(), now).unwrap();
        let b = draft()
            .build(TicketId::new(), now)
            .unwrap()
            .checked_in(StaffId::new("door-1"), now);

        state.tickets.insert(a.id, a);
        state.tickets.insert(b.id, b);

        assert_eq!(state.count(), 2);
        assert_eq!(state.checked_in_count(), 1);
    }
}
