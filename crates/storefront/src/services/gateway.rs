//! Payment gateway seam: request/response types and the trait the checkout
//! and webhook flows are written against.
//!
//! The production implementation is [`crate::services::MercadoPagoClient`];
//! tests substitute an in-process fake. The trait is deliberately narrow:
//! the storefront only ever creates a hosted-checkout preference and fetches
//! payment details by id.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sabia_core::{CustomerData, OrderReference, PaymentStatus};

/// Errors that can occur when talking to the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// One line of a hosted-checkout preference.
///
/// Cart lines map one-to-one; shipping and coupon discounts become synthetic
/// lines ("Frete", "Desconto") so the hosted page shows the same breakdown
/// the customer saw in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceItem {
    pub title: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub currency_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
}

impl PreferenceItem {
    /// A BRL line without an image.
    #[must_use]
    pub fn synthetic(title: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            title: title.into(),
            quantity: 1,
            unit_price,
            currency_id: "BRL".to_string(),
            picture_url: None,
        }
    }
}

/// Redirect targets for the hosted checkout page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

/// Everything the gateway needs to build a hosted checkout page.
#[derive(Debug, Clone)]
pub struct PreferenceRequest {
    pub items: Vec<PreferenceItem>,
    pub payer: CustomerData,
    pub external_reference: OrderReference,
    pub back_urls: BackUrls,
    pub notification_url: String,
}

/// A created preference, as returned by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Preference {
    pub id: String,
    pub init_point: String,
    pub sandbox_init_point: String,
}

/// Payment details fetched from the gateway.
///
/// The webhook body is never trusted to contain these; they are always
/// re-fetched by payment id.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: i64,
    pub status: PaymentStatus,
    pub status_detail: Option<String>,
    pub external_reference: Option<OrderReference>,
    pub transaction_amount: Option<Decimal>,
    pub payer_email: Option<String>,
}

/// The payment gateway operations the storefront depends on.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted-checkout preference.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the gateway rejects the preference or the
    /// request fails.
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<Preference, GatewayError>;

    /// Fetch full payment details by gateway payment id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the payment cannot be fetched or parsed.
    async fn get_payment(&self, payment_id: i64) -> Result<Payment, GatewayError>;
}
