//! Ticket management API endpoints.
//!
//! - `POST /api/tickets` - Issue a new ticket
//! - `GET /api/tickets/:id` - Get a ticket
//! - `POST /api/tickets/:id/checkin` - Check a ticket in at the door
//!
//! # State Machine
//!
//! ```text
//! Issued ──checkin──▶ CheckedIn (terminal)
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::server::state::AppState;
use turnstile_ledger::{
    EntryType, GenderBreakdown, GuestId, Money, PrCode, StaffId, Ticket, TicketDraft, TicketId,
    TicketStatus, TicketType,
};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to issue a new ticket.
///
/// `guest_id` and `ticket_type` are optional on the wire; presence is
/// validated by the ledger so that missing fields surface as 422 rather
/// than as deserialization noise.
#[derive(Debug, Deserialize)]
pub struct IssueTicketRequest {
    /// Guest the ticket belongs to
    pub guest_id: Option<String>,
    /// Ticket tier
    pub ticket_type: Option<TicketType>,
    /// Entry lane (defaults to standard)
    #[serde(default = "default_entry_type")]
    pub entry_type: EntryType,
    /// Number of guests on this ticket (defaults to 1)
    #[serde(default = "default_group_size")]
    pub group_size: u32,
    /// Gender breakdown of the group (defaults to all zero, which only
    /// passes validation when it sums to the group size)
    #[serde(default)]
    pub gender: GenderBreakdown,
    /// Whether the group is a couple
    #[serde(default)]
    pub is_couple: bool,
    /// Cover charge in cents
    #[serde(default)]
    pub cover_charge_cents: u64,
    /// Opaque payment transaction reference
    #[serde(default)]
    pub payment_ref: Option<String>,
    /// Promoter attribution code
    #[serde(default)]
    pub pr_code: Option<String>,
}

const fn default_entry_type() -> EntryType {
    EntryType::Standard
}

const fn default_group_size() -> u32 {
    1
}

impl IssueTicketRequest {
    fn into_draft(self) -> TicketDraft {
        TicketDraft {
            guest: self.guest_id.map(GuestId::new),
            ticket_type: self.ticket_type,
            entry_type: self.entry_type,
            group_size: self.group_size,
            gender: self.gender,
            is_couple: self.is_couple,
            cover_charge: Money::from_cents(self.cover_charge_cents),
            payment_ref: self.payment_ref,
            pr_code: self.pr_code.map(PrCode::new),
        }
    }
}

/// Request to check a ticket in.
#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    /// Staff member performing the check-in
    pub staff_id: String,
}

/// Ticket details response.
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    /// Ticket ID
    pub ticket_id: Uuid,
    /// Guest reference
    pub guest_id: String,
    /// Ticket tier
    pub ticket_type: TicketType,
    /// Entry lane
    pub entry_type: EntryType,
    /// Number of guests on this ticket
    pub group_size: u32,
    /// Gender breakdown
    pub gender: GenderBreakdown,
    /// Whether the group is a couple
    pub is_couple: bool,
    /// Cover charge in cents
    pub cover_charge_cents: u64,
    /// Payment transaction reference
    pub payment_ref: Option<String>,
    /// Promoter attribution code
    pub pr_code: Option<String>,
    /// Lifecycle status (`issued` or `checked_in`)
    pub status: String,
    /// When the ticket was issued
    pub issued_at: DateTime<Utc>,
    /// When the ticket was checked in (if it was)
    pub checked_in_at: Option<DateTime<Utc>>,
    /// Who checked the ticket in (if anyone)
    pub checked_in_by: Option<String>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        let (status, checked_in_at, checked_in_by) = match &ticket.status {
            TicketStatus::Issued => ("issued".to_string(), None, None),
            TicketStatus::CheckedIn { at, staff } => (
                "checked_in".to_string(),
                Some(*at),
                Some(staff.as_str().to_string()),
            ),
        };

        Self {
            ticket_id: *ticket.id.as_uuid(),
            guest_id: ticket.guest.as_str().to_string(),
            ticket_type: ticket.ticket_type,
            entry_type: ticket.entry_type,
            group_size: ticket.group_size,
            gender: ticket.gender,
            is_couple: ticket.is_couple,
            cover_charge_cents: ticket.cover_charge.cents(),
            payment_ref: ticket.payment_ref,
            pr_code: ticket.pr_code.map(|code| code.as_str().to_string()),
            status,
            issued_at: ticket.issued_at,
            checked_in_at,
            checked_in_by,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Issue a new ticket.
///
/// # Errors
///
/// - 422 when the draft fails validation
/// - 503/504 on store or timeout failures
pub async fn issue_ticket(
    State(state): State<AppState>,
    Json(request): Json<IssueTicketRequest>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let ticket = state.service.issue(request.into_draft()).await?;
    Ok((StatusCode::CREATED, Json(ticket.into())))
}

/// Get a ticket by id.
///
/// # Errors
///
/// - 404 when no such ticket exists
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket = state.service.ticket(TicketId::from_uuid(id)).await?;
    Ok(Json(ticket.into()))
}

/// Check a ticket in at the door.
///
/// # Errors
///
/// - 404 when no such ticket exists
/// - 409 when the ticket is already checked in
/// - 503/504 on store or timeout failures
pub async fn check_in_ticket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket = state
        .service
        .check_in(TicketId::from_uuid(id), StaffId::new(request.staff_id))
        .await?;
    Ok(Json(ticket.into()))
}
