//! Integration tests for the reminder trigger endpoint
//!
//! Uses the in-memory store so the endpoint contract can be checked without
//! a database.

use std::sync::Arc;

use actix_web::{test, web, App};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use stackd::config::SecurityConfig;
use stackd::reminders::{FixedClock, ReminderScheduler};
use stackd::routes;
use stackd::services::{BookingStore, InMemoryBookingStore};
use uuid::Uuid;

use crate::common::{fixed_now, BookingBuilder, FailingStore, RecordingSender};

fn security(key: Option<&str>) -> web::Data<SecurityConfig> {
    web::Data::new(SecurityConfig {
        service_api_key: key.map(str::to_string),
    })
}

fn scheduler_with(
    store: Arc<dyn BookingStore>,
    sender: Arc<RecordingSender>,
) -> web::Data<ReminderScheduler> {
    web::Data::new(ReminderScheduler::new(
        store,
        sender,
        Arc::new(FixedClock::new(fixed_now())),
    ))
}

/// Store with one booking inside the window and one outside it
fn seeded_store(email: &str) -> Arc<InMemoryBookingStore> {
    let store = Arc::new(InMemoryBookingStore::new());
    let user_id = Uuid::new_v4();
    store.insert_user(user_id, Some(email));
    store.insert_booking(BookingBuilder::new(user_id).on("2024-01-04").at("01:00").build());
    store.insert_booking(BookingBuilder::new(user_id).on("2024-01-04").at("06:00").build());
    store
}

// =============================================================================
// Success Tests
// =============================================================================

#[actix_web::test]
async fn test_run_returns_reminder_count() {
    let store = seeded_store("guest@example.com");
    let sender = Arc::new(RecordingSender::new());

    let app = test::init_service(
        App::new()
            .app_data(security(None))
            .app_data(scheduler_with(store.clone(), sender.clone()))
            .configure(routes::reminders::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/reminders/run")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "success": true, "remindersCount": 1 }));
    assert_eq!(store.mark_count(), 1);
}

#[actix_web::test]
async fn test_repeated_trigger_reports_zero() {
    let store = seeded_store("guest@example.com");
    let sender = Arc::new(RecordingSender::new());

    let app = test::init_service(
        App::new()
            .app_data(security(None))
            .app_data(scheduler_with(store, sender.clone()))
            .configure(routes::reminders::configure),
    )
    .await;

    for expected in [1, 0] {
        let req = test::TestRequest::post()
            .uri("/api/reminders/run")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["remindersCount"], expected);
    }

    assert_eq!(sender.sent().len(), 1);
}

#[actix_web::test]
async fn test_delivery_failures_still_return_success() {
    let store = seeded_store("bounce@example.com");
    let sender = Arc::new(RecordingSender::failing_for(&["bounce@example.com"]));

    let app = test::init_service(
        App::new()
            .app_data(security(None))
            .app_data(scheduler_with(store.clone(), sender))
            .configure(routes::reminders::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/reminders/run")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "success": true, "remindersCount": 0 }));
    assert_eq!(store.mark_count(), 0);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[actix_web::test]
async fn test_query_failure_returns_500_with_error() {
    let sender = Arc::new(RecordingSender::new());

    let app = test::init_service(
        App::new()
            .app_data(security(None))
            .app_data(scheduler_with(Arc::new(FailingStore), sender.clone()))
            .configure(routes::reminders::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/reminders/run")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("connection refused"));
    assert!(body.get("success").is_none());
    assert!(sender.sent().is_empty());
}

// =============================================================================
// Auth Tests
// =============================================================================

#[actix_web::test]
async fn test_run_requires_service_key_when_configured() {
    let store = seeded_store("guest@example.com");
    let sender = Arc::new(RecordingSender::new());

    let app = test::init_service(
        App::new()
            .app_data(security(Some("service-key")))
            .app_data(scheduler_with(store.clone(), sender.clone()))
            .configure(routes::reminders::configure),
    )
    .await;

    let missing = test::TestRequest::post()
        .uri("/api/reminders/run")
        .to_request();
    assert_eq!(test::call_service(&app, missing).await.status(), 401);

    let wrong = test::TestRequest::post()
        .uri("/api/reminders/run")
        .insert_header(("Authorization", "Bearer nope"))
        .to_request();
    assert_eq!(test::call_service(&app, wrong).await.status(), 401);

    assert!(sender.sent().is_empty());

    let valid = test::TestRequest::post()
        .uri("/api/reminders/run")
        .insert_header(("Authorization", "Bearer service-key"))
        .to_request();
    let resp = test::call_service(&app, valid).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(store.mark_count(), 1);
}
