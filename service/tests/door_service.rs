//! End-to-end tests for the door service: ledger, counters, and failure
//! paths over the in-memory store backends.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Utc};
use std::sync::Arc;
use turnstile_ledger::{
    EntryType, GenderBreakdown, GuestId, LedgerError, Money, PrCode, StaffId, TicketDraft,
    TicketId, TicketType, ValidationError,
};
use turnstile_memstore::{MemoryCounterStore, MemoryTicketStore};
use turnstile_service::config::{Config, RetrySettings, ServerConfig, StoreSettings};
use turnstile_service::{DoorService, ServiceError};
use turnstile_testing::{FixedClock, FlakyCounterStore, FlakyTicketStore, test_clock};

fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            log_level: "warn".to_string(),
            metrics_host: "127.0.0.1".to_string(),
            metrics_port: 0,
            shutdown_timeout: 5,
            request_timeout: 5,
        },
        store: StoreSettings {
            dlq_max_size: 100,
            broadcast_capacity: 64,
        },
        retry: RetrySettings {
            max_retries: 3,
            initial_delay_ms: 1,
            max_delay_ms: 20,
        },
    }
}

fn service() -> DoorService {
    DoorService::with_clock(
        Arc::new(test_clock()),
        Arc::new(MemoryTicketStore::new()),
        Arc::new(MemoryCounterStore::new()),
        &test_config(),
    )
}

fn service_at_hour_22() -> DoorService {
    let clock = FixedClock::new(
        DateTime::parse_from_rfc3339("2025-01-01T22:30:00Z")
            .unwrap()
            .with_timezone(&Utc),
    );
    DoorService::with_clock(
        Arc::new(clock),
        Arc::new(MemoryTicketStore::new()),
        Arc::new(MemoryCounterStore::new()),
        &test_config(),
    )
}

fn draft(ticket_type: TicketType) -> TicketDraft {
    TicketDraft {
        guest: Some(GuestId::new("guest-1")),
        ticket_type: Some(ticket_type),
        entry_type: EntryType::Standard,
        group_size: 1,
        gender: GenderBreakdown::new(1, 0, 0),
        is_couple: false,
        cover_charge: Money::from_cents(2500),
        payment_ref: None,
        pr_code: None,
    }
}

fn couple_draft() -> TicketDraft {
    TicketDraft {
        guest: Some(GuestId::new("guest-2")),
        ticket_type: Some(TicketType::Vip),
        entry_type: EntryType::Express,
        group_size: 2,
        gender: GenderBreakdown::new(1, 1, 0),
        is_couple: true,
        cover_charge: Money::from_cents(10000),
        payment_ref: Some("txn-42".to_string()),
        pr_code: Some(PrCode::new("anna")),
    }
}

#[tokio::test]
async fn issue_records_ticket_and_increments_total() {
    let service = service();

    let ticket = service.issue(draft(TicketType::Tier1)).await.unwrap();
    assert!(!ticket.is_checked_in());

    let snapshot = service.snapshot().await.unwrap();
    assert_eq!(snapshot.total(), 1);
    assert_eq!(snapshot.ticket_type(TicketType::Tier1), 1);
    assert_eq!(snapshot.entry_type(EntryType::Standard), 1);
    // No check-in yet, so no occupancy
    assert_eq!(snapshot.current_occupancy(), 0);

    let fetched = service.ticket(ticket.id).await.unwrap();
    assert_eq!(fetched, ticket);
}

#[tokio::test]
async fn invalid_gender_breakdown_touches_no_counters() {
    let service = service();

    let mut bad = draft(TicketType::Vip);
    bad.gender = GenderBreakdown::new(2, 1, 0); // sums to 3, group is 1

    let err = service.issue(bad).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Ledger(LedgerError::Validation(ValidationError::GenderMismatch {
            expected: 1,
            actual: 3
        }))
    ));

    let snapshot = service.snapshot().await.unwrap();
    assert!(snapshot.is_empty(), "counters must be untouched: {snapshot:?}");
}

#[tokio::test]
async fn missing_guest_is_a_validation_error() {
    let service = service();

    let mut bad = draft(TicketType::Vip);
    bad.guest = None;

    let err = service.issue(bad).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Ledger(LedgerError::Validation(ValidationError::MissingGuest))
    ));
}

#[tokio::test]
async fn check_in_applies_the_documented_counter_batch() {
    let service = service_at_hour_22();

    let ticket = service.issue(couple_draft()).await.unwrap();
    let checked_in = service
        .check_in(ticket.id, StaffId::new("door-1"))
        .await
        .unwrap();
    assert!(checked_in.is_checked_in());

    let snapshot = service.snapshot().await.unwrap();
    assert_eq!(snapshot.current_occupancy(), 2);
    assert_eq!(snapshot.hourly_checkins(22), 1);
    assert_eq!(snapshot.gender_ratio().male, 1);
    assert_eq!(snapshot.gender_ratio().female, 1);
    assert_eq!(snapshot.couples_count(), 1);
    assert_eq!(snapshot.pr_code(&PrCode::new("anna")), 1);
}

#[tokio::test]
async fn duplicate_check_in_is_reported_and_counts_stay_put() {
    let service = service();

    let ticket = service.issue(couple_draft()).await.unwrap();
    service
        .check_in(ticket.id, StaffId::new("door-1"))
        .await
        .unwrap();
    let before = service.snapshot().await.unwrap();

    let err = service
        .check_in(ticket.id, StaffId::new("door-2"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Ledger(LedgerError::AlreadyCheckedIn(id)) if id == ticket.id
    ));

    let after = service.snapshot().await.unwrap();
    assert_eq!(before, after, "a rejected check-in must not move counters");
}

#[tokio::test]
async fn check_in_of_unknown_ticket_is_not_found() {
    let service = service();
    let unknown = TicketId::new();

    let err = service
        .check_in(unknown, StaffId::new("door-1"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Ledger(LedgerError::NotFound(id)) if id == unknown
    ));
}

#[tokio::test]
async fn concurrent_issuances_are_all_reflected() {
    let service = Arc::new(service());

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.issue(draft(TicketType::Vip)).await })
        })
        .collect();
    for task in futures::future::join_all(tasks).await {
        task.unwrap().unwrap();
    }

    let snapshot = service.snapshot().await.unwrap();
    assert_eq!(snapshot.ticket_type(TicketType::Vip), 10);
    assert_eq!(snapshot.total(), 10);
}

#[tokio::test]
async fn transient_record_store_failures_are_retried() {
    let flaky = Arc::new(FlakyTicketStore::failing(
        Arc::new(MemoryTicketStore::new()),
        2,
    ));
    let service = DoorService::with_clock(
        Arc::new(test_clock()),
        flaky,
        Arc::new(MemoryCounterStore::new()),
        &test_config(),
    );

    let ticket = service.issue(draft(TicketType::Guestlist)).await.unwrap();
    assert_eq!(service.snapshot().await.unwrap().total(), 1);
    assert!(service.ticket(ticket.id).await.is_ok());
}

#[tokio::test]
async fn exhausted_record_store_retries_surface_unavailable() {
    let flaky = Arc::new(FlakyTicketStore::failing(
        Arc::new(MemoryTicketStore::new()),
        usize::MAX,
    ));
    let service = DoorService::with_clock(
        Arc::new(test_clock()),
        flaky,
        Arc::new(MemoryCounterStore::new()),
        &test_config(),
    );

    let err = service.issue(draft(TicketType::Tier2)).await.unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Ledger(LedgerError::StoreUnavailable(_))
    ));
    assert!(service.snapshot().await.unwrap().is_empty());
}

#[tokio::test]
async fn exhausted_counter_retries_dead_letter_the_event() {
    let flaky = Arc::new(FlakyCounterStore::failing(
        Arc::new(MemoryCounterStore::new()),
        usize::MAX,
    ));
    let service = DoorService::with_clock(
        Arc::new(test_clock()),
        Arc::new(MemoryTicketStore::new()),
        flaky,
        &test_config(),
    );

    let err = service.issue(draft(TicketType::Vip)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Aggregation(_)));

    // The record is durable; only the counter batch is parked for replay
    let dead = service.dead_letters();
    assert_eq!(dead.len(), 1);
    let entry = dead.peek().unwrap();
    assert_eq!(entry.retry_count, 3);

    let report = service.health();
    assert!(report.status.is_degraded());
}

#[tokio::test]
async fn healthy_service_reports_healthy() {
    let service = service();
    service.issue(draft(TicketType::Tier1)).await.unwrap();

    let report = service.health();
    assert!(report.is_healthy());
}

#[tokio::test]
async fn shutdown_completes_with_no_inflight_work() {
    let service = service();
    service.issue(draft(TicketType::Tier1)).await.unwrap();

    service
        .shutdown(std::time::Duration::from_secs(1))
        .await
        .unwrap();

    let err = service.issue(draft(TicketType::Tier1)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Unavailable));
}
