//! Checkout route handler: cookie cart to hosted-checkout preference.

use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sabia_core::{CustomerData, OrderReference};

use crate::checkout::{self, CheckoutTotals};
use crate::error::{AppError, Result};
use crate::models::read_cart;
use crate::services::{BackUrls, Preference, PreferenceRequest};
use crate::state::AppState;

/// Checkout request: customer payload plus an optional coupon code.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub customer: CustomerData,
    #[serde(default)]
    pub coupon: Option<String>,
}

/// The created preference, plus the validated checkout URL to redirect to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub id: String,
    pub init_point: String,
    pub sandbox_init_point: String,
    pub external_reference: String,
    pub checkout_url: String,
}

/// Build a hosted-checkout preference from the cookie cart.
///
/// Validates the customer payload, prices the cart, creates the gateway
/// preference, stashes the checkout data for the webhook, and returns the
/// allow-list-validated checkout URL. Any failure before the stash insert
/// leaves no entry behind.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    request
        .customer
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let cart = read_cart(&headers);
    if cart.is_empty() {
        return Err(AppError::BadRequest("Carrinho vazio".to_string()));
    }

    let discount = request
        .coupon
        .as_ref()
        .and_then(|code| state.config().coupons.get(&code.trim().to_uppercase()));
    let totals = CheckoutTotals::compute(&cart, discount);

    let reference = OrderReference::generate();
    let base_url = state.config().base_url.trim_end_matches('/');

    let preference_request = PreferenceRequest {
        items: checkout::preference_items(&cart, &totals),
        payer: request.customer.clone(),
        external_reference: reference.clone(),
        back_urls: BackUrls {
            success: format!("{base_url}/checkout/success"),
            failure: format!("{base_url}/checkout/failure"),
            pending: format!("{base_url}/checkout/pending"),
        },
        notification_url: format!("{base_url}/api/webhooks/payment"),
    };

    let preference = state.gateway().create_preference(&preference_request).await?;

    let checkout_url = select_checkout_url(&state, &preference)?;

    state
        .stash()
        .insert(reference.clone(), cart, request.customer, totals);

    tracing::info!(
        preference_id = %preference.id,
        external_reference = %reference,
        "Checkout preference created"
    );

    Ok(Json(CheckoutResponse {
        success: true,
        id: preference.id,
        init_point: preference.init_point,
        sandbox_init_point: preference.sandbox_init_point,
        external_reference: reference.to_string(),
        checkout_url,
    }))
}

/// Pick the environment's checkout URL and enforce the origin allow-list.
fn select_checkout_url(state: &AppState, preference: &Preference) -> Result<String> {
    let url = if state.config().mercado_pago.sandbox {
        &preference.sandbox_init_point
    } else {
        &preference.init_point
    };

    if !checkout::is_allowed_checkout_url(url, &state.config().checkout_allowed_origins) {
        tracing::error!(url = %url, "Gateway returned a checkout URL outside the allow-list");
        return Err(AppError::Internal(
            "checkout URL origin not allow-listed".to_string(),
        ));
    }

    Ok(url.clone())
}
