//! Payment webhook tests: status branching, stash lifecycle, always-200.

#![allow(clippy::unwrap_used)]

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::json;

use sabia_core::{OrderReference, PaymentStatus};
use sabia_integration_tests::{
    FakeGateway, RecordingMailer, call, payment, stash_checkout, test_app,
};
use sabia_storefront::services::OrderEmailKind;

fn webhook_request(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/webhooks/payment")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn approved_payment_sends_one_email_and_empties_the_stash() {
    let gateway = FakeGateway::new();
    let mailer = RecordingMailer::new();
    let (app, state) = test_app(gateway.clone(), mailer.clone());

    let reference = OrderReference::new("SB-1-abc");
    stash_checkout(&state, &reference);
    gateway.set_payment(payment(123, PaymentStatus::Approved, &reference));

    let body = json!({"type": "payment", "data": {"id": 123}});

    let (status, _, response) = call(app.clone(), webhook_request(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["received"], true);
    assert_eq!(mailer.sent_count(), 1);
    assert_eq!(
        mailer.sent.lock().unwrap()[0],
        (OrderEmailKind::Confirmation, "SB-1-abc".to_string())
    );
    assert!(state.stash().is_empty());

    // The same notification again: no stash entry, no email, still 200
    let (status, _, response) = call(app, webhook_request(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["received"], true);
    assert_eq!(mailer.sent_count(), 1);
}

#[tokio::test]
async fn pending_payment_keeps_the_stash_and_resends() {
    let gateway = FakeGateway::new();
    let mailer = RecordingMailer::new();
    let (app, state) = test_app(gateway.clone(), mailer.clone());

    let reference = OrderReference::new("SB-2-def");
    stash_checkout(&state, &reference);
    gateway.set_payment(payment(456, PaymentStatus::Pending, &reference));

    let body = json!({"type": "payment", "data": {"id": 456}});

    for expected in 1..=2 {
        let (status, _, _) = call(app.clone(), webhook_request(&body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mailer.sent_count(), expected);
    }

    // Pending is not terminal, so the entry survives for a later outcome
    assert!(state.stash().get(&reference).is_some());
}

#[tokio::test]
async fn rejected_payment_sends_rejection_and_deletes_the_stash() {
    let gateway = FakeGateway::new();
    let mailer = RecordingMailer::new();
    let (app, state) = test_app(gateway.clone(), mailer.clone());

    let reference = OrderReference::new("SB-3-ghi");
    stash_checkout(&state, &reference);
    gateway.set_payment(payment(789, PaymentStatus::Rejected, &reference));

    let (status, _, _) = call(
        app,
        webhook_request(&json!({"type": "payment", "data": {"id": 789}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        mailer.sent.lock().unwrap()[0].0,
        OrderEmailKind::Rejected
    );
    assert!(state.stash().is_empty());
}

#[tokio::test]
async fn unknown_reference_sends_nothing_and_still_acknowledges() {
    let gateway = FakeGateway::new();
    let mailer = RecordingMailer::new();
    let (app, _) = test_app(gateway.clone(), mailer.clone());

    let reference = OrderReference::new("SB-9-zzz");
    gateway.set_payment(payment(999, PaymentStatus::Approved, &reference));

    let (status, _, response) = call(
        app,
        webhook_request(&json!({"type": "payment", "data": {"id": 999}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["received"], true);
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn non_payment_notification_is_acknowledged_and_ignored() {
    let gateway = FakeGateway::new();
    let mailer = RecordingMailer::new();
    let (app, _) = test_app(gateway.clone(), mailer.clone());

    let (status, _, response) = call(
        app,
        webhook_request(&json!({"type": "test", "data": {"id": 1}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["received"], true);
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn unknown_status_is_logged_and_ignored() {
    let gateway = FakeGateway::new();
    let mailer = RecordingMailer::new();
    let (app, state) = test_app(gateway.clone(), mailer.clone());

    let reference = OrderReference::new("SB-4-jkl");
    stash_checkout(&state, &reference);
    gateway.set_payment(payment(
        321,
        PaymentStatus::Other("in_mediation".to_string()),
        &reference,
    ));

    let (status, _, _) = call(
        app,
        webhook_request(&json!({"type": "payment", "data": {"id": 321}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(mailer.sent_count(), 0);
    // Entry untouched - a later approved/rejected webhook can still resolve it
    assert!(state.stash().get(&reference).is_some());
}

#[tokio::test]
async fn payment_fetch_failure_still_returns_200() {
    let gateway = FakeGateway::new();
    let mailer = RecordingMailer::new();
    let (app, _) = test_app(gateway, mailer.clone());

    // No payment preloaded: the fake's lookup fails like a gateway 404
    let (status, _, response) = call(
        app,
        webhook_request(&json!({"type": "payment", "data": {"id": 555}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["received"], true);
    assert_eq!(mailer.sent_count(), 0);
}
