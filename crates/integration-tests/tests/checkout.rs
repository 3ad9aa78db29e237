//! Checkout flow tests: validation, pricing lines, stash, URL allow-list.

#![allow(clippy::unwrap_used)]

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use rust_decimal::Decimal;

use sabia_core::{Cart, OrderReference};
use sabia_integration_tests::{
    FakeGateway, RecordingMailer, call, cart_cookie, sample_checkout_body, sample_item,
    test_app,
};

fn checkout_request(cart: Option<&Cart>, body: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/checkout")
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(cart) = cart {
        builder = builder.header(header::COOKIE, cart_cookie(cart));
    }

    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn two_item_cart() -> Cart {
    let mut cart = Cart::new();
    cart.add(sample_item("p1", "59.90", 10));
    cart.set_quantity("p1", 2);
    cart.add(sample_item("p2", "25.00", 5));
    cart
}

#[tokio::test]
async fn empty_cart_is_rejected_before_any_gateway_call() {
    let gateway = FakeGateway::new();
    let (app, state) = test_app(gateway.clone(), RecordingMailer::new());

    let (status, _, body) = call(app, checkout_request(None, &sample_checkout_body())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Carrinho vazio");
    assert_eq!(gateway.preference_count(), 0);
    assert!(state.stash().is_empty());
}

#[tokio::test]
async fn missing_customer_field_is_a_field_error() {
    let gateway = FakeGateway::new();
    let (app, _) = test_app(gateway.clone(), RecordingMailer::new());

    let mut payload = sample_checkout_body();
    payload["email"] = serde_json::json!("");

    let (status, _, body) = call(app, checkout_request(Some(&two_item_cart()), &payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "E-mail é obrigatório");
    assert_eq!(gateway.preference_count(), 0);
}

#[tokio::test]
async fn checkout_builds_preference_and_stashes_the_order() {
    let gateway = FakeGateway::new();
    let (app, state) = test_app(gateway.clone(), RecordingMailer::new());

    let cart = two_item_cart();
    let (status, _, body) = call(app, checkout_request(Some(&cart), &sample_checkout_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["id"], "pref-1");
    assert!(
        body["checkoutUrl"]
            .as_str()
            .unwrap()
            .starts_with("https://www.mercadopago.com.br/")
    );

    let reference = OrderReference::new(body["externalReference"].as_str().unwrap());
    let entry = state.stash().get(&reference).expect("stashed entry");
    assert_eq!(entry.cart, cart);
    // 144.80 subtotal, above the free-shipping threshold
    assert_eq!(entry.totals.subtotal, "144.80".parse::<Decimal>().unwrap());
    assert_eq!(entry.totals.shipping, Decimal::ZERO);

    // One preference, no synthetic lines needed
    assert_eq!(gateway.preference_count(), 1);
    let request = gateway.preferences.lock().unwrap()[0].clone();
    assert_eq!(request.items.len(), 2);
    assert_eq!(
        request.notification_url,
        "https://lojasabia.com.br/api/webhooks/payment"
    );
}

#[tokio::test]
async fn below_threshold_cart_gets_a_frete_line() {
    let gateway = FakeGateway::new();
    let (app, _) = test_app(gateway.clone(), RecordingMailer::new());

    let mut cart = Cart::new();
    cart.add(sample_item("p1", "30.00", 10));

    let (status, _, _) = call(app, checkout_request(Some(&cart), &sample_checkout_body())).await;
    assert_eq!(status, StatusCode::OK);

    let request = gateway.preferences.lock().unwrap()[0].clone();
    let frete = request.items.last().unwrap();
    assert_eq!(frete.title, "Frete");
    assert_eq!(frete.unit_price, Decimal::from(40));
}

#[tokio::test]
async fn coupon_adds_a_negative_desconto_line() {
    let gateway = FakeGateway::new();
    let (app, _) = test_app(gateway.clone(), RecordingMailer::new());

    let mut payload = sample_checkout_body();
    payload["coupon"] = serde_json::json!("bemvindo10");

    let (status, _, _) = call(
        app,
        checkout_request(Some(&two_item_cart()), &payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let request = gateway.preferences.lock().unwrap()[0].clone();
    let desconto = request.items.last().unwrap();
    assert_eq!(desconto.title, "Desconto");
    // 10% of 144.80
    assert_eq!(desconto.unit_price, "-14.48".parse::<Decimal>().unwrap());
}

#[tokio::test]
async fn unknown_coupon_is_ignored() {
    let gateway = FakeGateway::new();
    let (app, state) = test_app(gateway.clone(), RecordingMailer::new());

    let mut payload = sample_checkout_body();
    payload["coupon"] = serde_json::json!("NADA");

    let (status, _, body) = call(
        app,
        checkout_request(Some(&two_item_cart()), &payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let reference = OrderReference::new(body["externalReference"].as_str().unwrap());
    let entry = state.stash().get(&reference).unwrap();
    assert_eq!(entry.totals.discount, Decimal::ZERO);
}
