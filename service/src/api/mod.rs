//! HTTP API endpoints for the door service.

pub mod counters;
pub mod error;
pub mod tickets;

pub use error::ApiError;
