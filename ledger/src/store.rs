//! Record surface of the durable store collaborator.
//!
//! The ledger owns ticket records exclusively and reaches them through this
//! trait. The check-in transition is a conditional update: backends must
//! refuse it when the stored record is already terminal, which makes the
//! store the authoritative duplicate guard under concurrent check-ins.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use turnstile_core::store::Result;

use crate::types::{StaffId, Ticket, TicketId};

/// Durable record store for tickets.
///
/// # Dyn Compatibility
///
/// Methods return explicit `Pin<Box<dyn Future>>` instead of `async fn`
/// to allow `Arc<dyn TicketStore>` in the ledger environment.
pub trait TicketStore: Send + Sync {
    /// Create a record for a freshly issued ticket.
    ///
    /// Conditional: fails if a record already exists under the ticket id,
    /// so concurrent duplicate issuance loses deterministically.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AlreadyExists`](turnstile_core::store::StoreError::AlreadyExists)
    ///   when the id is taken
    /// - [`StoreError::Unavailable`](turnstile_core::store::StoreError::Unavailable)
    ///   on transient backend failure
    fn create(&self, ticket: Ticket) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Fetch a ticket record.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`](turnstile_core::store::StoreError::NotFound)
    ///   when no record exists under the id
    /// - [`StoreError::Unavailable`](turnstile_core::store::StoreError::Unavailable)
    ///   on transient backend failure
    fn get(&self, id: TicketId) -> Pin<Box<dyn Future<Output = Result<Ticket>> + Send + '_>>;

    /// Transition a ticket to `CheckedIn` (compare-and-set).
    ///
    /// Succeeds at most once per ticket: the update is applied only when
    /// the stored status is still `Issued`. Returns the updated record.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`](turnstile_core::store::StoreError::NotFound)
    ///   when no record exists under the id
    /// - [`StoreError::Conflict`](turnstile_core::store::StoreError::Conflict)
    ///   when the stored record is already checked in
    /// - [`StoreError::Unavailable`](turnstile_core::store::StoreError::Unavailable)
    ///   on transient backend failure
    fn check_in(
        &self,
        id: TicketId,
        staff: StaffId,
        at: DateTime<Utc>,
    ) -> Pin<Box<dyn Future<Output = Result<Ticket>> + Send + '_>>;
}
