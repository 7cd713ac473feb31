//! # Turnstile Service
//!
//! The imperative shell of the door service: configuration, the
//! [`DoorService`] facade over the ticket ledger and the counter
//! aggregator, and the HTTP surface.
//!
//! ## Entry points
//!
//! The presentation layer consumes exactly three operations:
//! [`DoorService::issue`], [`DoorService::check_in`], and
//! [`DoorService::snapshot`] — exposed over HTTP as
//! `POST /api/tickets`, `POST /api/tickets/:id/checkin`, and
//! `GET /api/counters`.

pub mod api;
pub mod app;
pub mod config;
pub mod metrics;
pub mod server;

pub use app::{DoorService, ServiceError};
pub use config::Config;
pub use server::{AppState, build_router};
