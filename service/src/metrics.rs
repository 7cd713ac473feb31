//! Business metrics for the door service.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `door_tickets_issued_total{ticket_type}` - Tickets issued by tier
//! - `door_checkins_total` - Successful check-ins
//! - `door_guests_admitted_total` - Guests admitted (sum of group sizes)
//! - `door_checkin_rejections_total` - Rejected check-in attempts
//! - `door_counter_updates_failed_total` - Counter batches that exhausted
//!   retries and were dead-lettered

use metrics::describe_counter;

/// Initialize and register all business metric descriptions.
///
/// This should be called once at application startup, before any metrics
/// are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "door_tickets_issued_total",
        "Total number of tickets issued, labelled by ticket type"
    );
    describe_counter!("door_checkins_total", "Total number of successful check-ins");
    describe_counter!(
        "door_guests_admitted_total",
        "Total number of guests admitted (sum of checked-in group sizes)"
    );
    describe_counter!(
        "door_checkin_rejections_total",
        "Total number of rejected check-in attempts (duplicates, unknown ids)"
    );
    describe_counter!(
        "door_counter_updates_failed_total",
        "Counter update batches that exhausted retries and were dead-lettered"
    );

    tracing::info!("Business metrics registered");
}
