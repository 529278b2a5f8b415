mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use common::TestApp;
use petsit_backend::domain::models::booking::{Booking, BookingStatus, NewBookingParams};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use tower::ServiceExt;

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn at_hour(days_ahead: i64, hour: u32) -> DateTime<Utc> {
    let date = (Utc::now() + Duration::days(days_ahead)).date_naive();
    Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
}

fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("expected decimal string")).unwrap()
}

async fn cancel(app: &TestApp, booking_id: &str, payload: Value) -> axum::response::Response {
    app.router.clone().oneshot(
        Request::builder().method("POST")
            .uri(format!("/api/v1/bookings/{}/cancel", booking_id))
            .header("Content-Type", "application/json")
            .header("X-Actor-Id", "admin-1")
            .body(Body::from(payload.to_string())).unwrap()
    ).await.unwrap()
}

#[tokio::test]
async fn test_full_refund_with_ample_notice() {
    let app = TestApp::new().await;
    let booking = app.seed_booking("sitter-1", at_hour(3, 10), 60, "25.00").await;

    let res = cancel(&app, &booking.id, json!({"reason": "travel"})).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    assert_eq!(body["cancelled"][0]["refund_rate"], 100);
    assert_eq!(decimal(&body["cancelled"][0]["refund_amount"]), Decimal::new(2500, 2));
    assert_eq!(decimal(&body["total_refund"]), Decimal::new(2500, 2));
    assert_eq!(body["cancelled"][0]["booking"]["status"], "cancelled");
}

#[tokio::test]
async fn test_half_refund_with_short_notice() {
    let app = TestApp::new().await;
    let booking = app.seed_booking("sitter-1", Utc::now() + Duration::hours(5), 60, "25.00").await;

    let res = cancel(&app, &booking.id, json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    assert_eq!(body["cancelled"][0]["refund_rate"], 50);
    assert_eq!(decimal(&body["cancelled"][0]["refund_amount"]), Decimal::new(1250, 2));
}

#[tokio::test]
async fn test_no_refund_under_two_hours() {
    let app = TestApp::new().await;
    let booking = app.seed_booking("sitter-1", Utc::now() + Duration::minutes(30), 60, "25.00").await;

    let res = cancel(&app, &booking.id, json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    assert_eq!(body["cancelled"][0]["refund_rate"], 0);
    assert_eq!(decimal(&body["cancelled"][0]["refund_amount"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_cancelling_twice_is_rejected_with_reasons() {
    let app = TestApp::new().await;
    let booking = app.seed_booking("sitter-1", at_hour(3, 10), 60, "25.00").await;

    let res = cancel(&app, &booking.id, json!({})).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = cancel(&app, &booking.id, json!({})).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = parse_body(res).await;
    let reasons = body["reasons"].as_array().unwrap();
    assert!(reasons.iter().any(|r| r.as_str().unwrap().contains("already cancelled")));
}

#[tokio::test]
async fn test_completed_booking_cannot_be_cancelled() {
    let app = TestApp::new().await;
    let mut booking = app.seed_booking("sitter-1", at_hour(3, 10), 60, "25.00").await;

    booking.status = BookingStatus::Completed;
    let version = booking.version;
    app.state.booking_repo.update_if_version(&booking, version).await.unwrap().unwrap();

    let res = cancel(&app, &booking.id, json!({})).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_cancel_requires_actor_identity() {
    let app = TestApp::new().await;
    let booking = app.seed_booking("sitter-1", at_hour(3, 10), 60, "25.00").await;

    let res = app.router.clone().oneshot(
        Request::builder().method("POST")
            .uri(format!("/api/v1/bookings/{}/cancel", booking.id))
            .header("Content-Type", "application/json")
            .body(Body::from(json!({}).to_string())).unwrap()
    ).await.unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_quote_is_read_only() {
    let app = TestApp::new().await;
    let booking = app.seed_booking("sitter-1", at_hour(3, 10), 60, "40.00").await;

    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/bookings/{}/cancellation-quote", booking.id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    assert_eq!(body["eligible"], true);
    assert_eq!(body["refund_rate"], 100);
    assert_eq!(decimal(&body["refund_amount"]), Decimal::new(4000, 2));

    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/bookings/{}", booking.id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(body["version"], 0);
}

async fn seed_series_member(app: &TestApp, series_id: &str, visit: i32, scheduled_at: DateTime<Utc>) -> Booking {
    let mut booking = Booking::new(NewBookingParams {
        client_id: "client-series".to_string(),
        sitter_id: Some("sitter-2".to_string()),
        service_type: "dog-walk".to_string(),
        scheduled_at,
        duration_min: 30,
        price: "20.00".to_string(),
    });
    booking.status = BookingStatus::Approved;
    booking.is_recurring = true;
    booking.recurring_series_id = Some(series_id.to_string());
    booking.visit_number = Some(visit);
    app.state.booking_repo.create(&booking).await.unwrap()
}

#[tokio::test]
async fn test_series_cancellation_cancels_every_future_visit() {
    let app = TestApp::new().await;
    let first = seed_series_member(&app, "series-9", 1, at_hour(2, 10)).await;
    let second = seed_series_member(&app, "series-9", 2, at_hour(9, 10)).await;
    let third = seed_series_member(&app, "series-9", 3, at_hour(16, 10)).await;

    let res = cancel(&app, &first.id, json!({"scope": "series", "reason": "moving away"})).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    let cancelled = body["cancelled"].as_array().unwrap();
    assert_eq!(cancelled.len(), 3);

    // Every visit is more than 24h out, so each refunds in full.
    assert_eq!(decimal(&body["total_refund"]), Decimal::new(6000, 2));

    for id in [&first.id, &second.id, &third.id] {
        let res = app.router.clone().oneshot(
            Request::builder().method("GET")
                .uri(format!("/api/v1/bookings/{}", id))
                .body(Body::empty()).unwrap()
        ).await.unwrap();
        let body = parse_body(res).await;
        assert_eq!(body["status"], "cancelled", "booking {} not cancelled", id);
    }
}

#[tokio::test]
async fn test_series_scope_on_non_recurring_booking_is_rejected() {
    let app = TestApp::new().await;
    let booking = app.seed_booking("sitter-1", at_hour(3, 10), 60, "25.00").await;

    let res = cancel(&app, &booking.id, json!({"scope": "series"})).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = parse_body(res).await;
    let reasons = body["reasons"].as_array().unwrap();
    assert!(reasons.iter().any(|r| r.as_str().unwrap().contains("recurring series")));

    // Not silently downgraded to a single cancellation.
    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/bookings/{}", booking.id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["status"], "approved");
}

#[tokio::test]
async fn test_malformed_price_fails_loud_not_free() {
    let app = TestApp::new().await;
    let booking = app.seed_booking("sitter-1", at_hour(3, 10), 60, "twenty-five").await;

    let res = cancel(&app, &booking.id, json!({})).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // The booking must be untouched by the failed attempt.
    let res = app.router.clone().oneshot(
        Request::builder().method("GET")
            .uri(format!("/api/v1/bookings/{}", booking.id))
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    let body = parse_body(res).await;
    assert_eq!(body["status"], "approved");
}

#[tokio::test]
async fn test_cancellation_is_audited() {
    let app = TestApp::new().await;
    let booking = app.seed_booking("sitter-1", at_hour(3, 10), 60, "25.00").await;

    let res = cancel(&app, &booking.id, json!({"reason": "sick pet"})).await;
    assert_eq!(res.status(), StatusCode::OK);

    // The audit write is fire-and-forget; give it a moment to land.
    let mut events = Vec::new();
    for _ in 0..20 {
        let res = app.router.clone().oneshot(
            Request::builder().method("GET")
                .uri(format!("/api/v1/bookings/{}/audit", booking.id))
                .body(Body::empty()).unwrap()
        ).await.unwrap();
        let body = parse_body(res).await;
        events = body.as_array().unwrap().clone();
        if !events.is_empty() { break; }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    }

    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["action"], "booking_cancelled");
    assert_eq!(events[0]["user_id"], "admin-1");
}
