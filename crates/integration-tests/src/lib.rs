//! Shared helpers for Sabiá integration tests.
//!
//! Builds the real storefront router with in-process fakes for the payment
//! gateway and the mailer, so tests can drive the full HTTP surface with
//! `tower::ServiceExt::oneshot` and assert on recorded side effects.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, HeaderValue, Request, StatusCode},
};
use secrecy::SecretString;
use tower::ServiceExt;

use sabia_core::{Cart, NewCartItem, OrderReference, PaymentStatus};
use sabia_storefront::checkout::{CheckoutTotals, Discount};
use sabia_storefront::config::{EmailConfig, MercadoPagoConfig, StorefrontConfig};
use sabia_storefront::models::cart_cookie_header;
use sabia_storefront::routes;
use sabia_storefront::services::{
    EmailError, GatewayError, Mailer, OrderEmail, OrderEmailKind, Payment, PaymentGateway,
    Preference, PreferenceRequest,
};
use sabia_storefront::state::AppState;

/// A gateway fake that records preference requests and serves payments from
/// a preloaded map.
#[derive(Default)]
pub struct FakeGateway {
    pub preferences: Mutex<Vec<PreferenceRequest>>,
    pub payments: Mutex<HashMap<i64, Payment>>,
}

impl FakeGateway {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Preload the payment returned by `get_payment`.
    pub fn set_payment(&self, payment: Payment) {
        self.payments.lock().unwrap().insert(payment.id, payment);
    }

    /// Number of preferences created through this fake.
    #[must_use]
    pub fn preference_count(&self) -> usize {
        self.preferences.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<Preference, GatewayError> {
        let mut preferences = self.preferences.lock().unwrap();
        preferences.push(request.clone());

        Ok(Preference {
            id: format!("pref-{}", preferences.len()),
            init_point: "https://www.mercadopago.com.br/checkout/v1/redirect?pref_id=pref-1"
                .to_string(),
            sandbox_init_point:
                "https://sandbox.mercadopago.com.br/checkout/v1/redirect?pref_id=pref-1"
                    .to_string(),
        })
    }

    async fn get_payment(&self, payment_id: i64) -> Result<Payment, GatewayError> {
        self.payments
            .lock()
            .unwrap()
            .get(&payment_id)
            .cloned()
            .ok_or(GatewayError::Api {
                status: 404,
                message: "payment not found".to_string(),
            })
    }
}

/// A mailer fake that records every send.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(OrderEmailKind, String)>>,
}

impl RecordingMailer {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of emails sent through this fake.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_order_status(
        &self,
        kind: OrderEmailKind,
        order: &OrderEmail,
    ) -> Result<(), EmailError> {
        self.sent
            .lock()
            .unwrap()
            .push((kind, order.reference.to_string()));
        Ok(())
    }
}

/// Storefront configuration for tests; no environment access.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "https://lojasabia.com.br".to_string(),
        mercado_pago: MercadoPagoConfig {
            access_token: SecretString::from("test-token"),
            sandbox: false,
        },
        checkout_allowed_origins: vec![
            "https://www.mercadopago.com.br".to_string(),
            "https://sandbox.mercadopago.com.br".to_string(),
        ],
        coupons: HashMap::from([("BEMVINDO10".to_string(), "10%".parse::<Discount>().unwrap())]),
        email: EmailConfig {
            smtp_host: "smtp.test.invalid".to_string(),
            smtp_port: 587,
            smtp_username: "mailer".to_string(),
            smtp_password: SecretString::from("pw"),
            from_address: "pedidos@lojasabia.com.br".to_string(),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
    }
}

/// Build the real router wired to the given fakes.
#[must_use]
pub fn test_app(
    gateway: Arc<FakeGateway>,
    mailer: Arc<RecordingMailer>,
) -> (Router, AppState) {
    let state = AppState::with_services(test_config(), gateway, mailer);
    let app = routes::routes().with_state(state.clone());
    (app, state)
}

/// Drive one request through the router and decode the JSON response.
///
/// # Panics
///
/// Panics if the response body is not empty or JSON - test surfaces here
/// always speak JSON.
pub async fn call(
    app: Router,
    request: Request<Body>,
) -> (StatusCode, HeaderMap, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, headers, json)
}

/// A cart item payload for test requests.
#[must_use]
pub fn sample_item(id: &str, price: &str, stock: u32) -> NewCartItem {
    NewCartItem {
        id: id.to_string(),
        name: format!("Produto {id}"),
        price: price.parse().unwrap(),
        image: format!("https://cdn.example.com/{id}.jpg"),
        slug: format!("produto-{id}"),
        stock,
    }
}

/// A `Cookie` header value carrying the given cart.
#[must_use]
pub fn cart_cookie(cart: &Cart) -> HeaderValue {
    let set_cookie = cart_cookie_header(cart);
    let pair = set_cookie
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    HeaderValue::from_str(&pair).unwrap()
}

/// A payment as the gateway would report it.
#[must_use]
pub fn payment(id: i64, status: PaymentStatus, reference: &OrderReference) -> Payment {
    Payment {
        id,
        status,
        status_detail: None,
        external_reference: Some(reference.clone()),
        transaction_amount: Some("159.80".parse().unwrap()),
        payer_email: Some("maria@example.com".to_string()),
    }
}

/// Stash a checkout for the given reference, as the checkout flow would.
pub fn stash_checkout(state: &AppState, reference: &OrderReference) {
    let mut cart = Cart::new();
    cart.add(sample_item("p1", "59.90", 10));
    cart.set_quantity("p1", 2);
    let totals = CheckoutTotals::compute(&cart, None);

    state.stash().insert(
        reference.clone(),
        cart,
        sample_customer(),
        totals,
    );
}

/// A valid checkout customer payload.
#[must_use]
pub fn sample_customer() -> sabia_core::CustomerData {
    sabia_core::CustomerData {
        email: "maria@example.com".to_string(),
        name: "Maria Silva".to_string(),
        phone: sabia_core::Phone {
            area_code: "11".to_string(),
            number: "987654321".to_string(),
        },
        address: sabia_core::Address {
            zip_code: "01310-100".to_string(),
            street_name: "Avenida Paulista".to_string(),
            street_number: "1000".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            neighborhood: Some("Bela Vista".to_string()),
            complement: None,
        },
    }
}

/// The JSON body of a checkout request for [`sample_customer`].
#[must_use]
pub fn sample_checkout_body() -> serde_json::Value {
    serde_json::json!({
        "email": "maria@example.com",
        "name": "Maria Silva",
        "phone": { "area_code": "11", "number": "987654321" },
        "address": {
            "zip_code": "01310-100",
            "street_name": "Avenida Paulista",
            "street_number": "1000",
            "city": "São Paulo",
            "state": "SP",
            "neighborhood": "Bela Vista"
        }
    })
}
