//! # Turnstile Aggregator
//!
//! Real-time counter aggregation over ticket ledger events.
//!
//! The [`CounterAggregator`] is the query side of the system: it consumes
//! [`LedgerEvent`](turnstile_ledger::LedgerEvent)s and maintains derived
//! counters (per-tier and per-lane issuance, promoter attribution, hourly
//! check-ins, gender ratio, occupancy, couples, totals) in the counter
//! store, one atomic batch per event.
//!
//! Counter keys are derived deterministically in [`keys`];
//! [`CounterSnapshot`] is the typed read model over a point-in-time copy
//! of the store.

pub mod keys;
pub mod projection;
pub mod snapshot;

pub use projection::CounterAggregator;
pub use snapshot::{CounterSnapshot, GenderRatio};
