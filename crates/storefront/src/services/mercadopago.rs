//! Mercado Pago API client.
//!
//! Implements [`PaymentGateway`] over the REST API: preference creation for
//! the hosted checkout page and payment lookup for webhook processing.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use sabia_core::PaymentStatus;

use crate::config::MercadoPagoConfig;
use crate::services::gateway::{
    BackUrls, GatewayError, Payment, PaymentGateway, Preference, PreferenceItem,
    PreferenceRequest,
};

/// Mercado Pago API base URL.
const BASE_URL: &str = "https://api.mercadopago.com";

/// Client for the Mercado Pago API.
#[derive(Clone)]
pub struct MercadoPagoClient {
    inner: Arc<MercadoPagoClientInner>,
}

struct MercadoPagoClientInner {
    client: reqwest::Client,
}

impl MercadoPagoClient {
    /// Create a new Mercado Pago API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &MercadoPagoConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.access_token.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value)
                .map_err(|e| GatewayError::Parse(format!("Invalid access token format: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(MercadoPagoClientInner { client }),
        })
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoClient {
    #[instrument(skip(self, request), fields(external_reference = %request.external_reference))]
    async fn create_preference(
        &self,
        request: &PreferenceRequest,
    ) -> Result<Preference, GatewayError> {
        let url = format!("{BASE_URL}/checkout/preferences");
        let body = CreatePreferenceBody::from(request);

        let response = self.inner.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let preference: Preference = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        debug!(preference_id = %preference.id, "Created checkout preference");
        Ok(preference)
    }

    #[instrument(skip(self))]
    async fn get_payment(&self, payment_id: i64) -> Result<Payment, GatewayError> {
        let url = format!("{BASE_URL}/v1/payments/{payment_id}");

        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payment: PaymentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        Ok(payment.into())
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// Request body for `POST /checkout/preferences`.
#[derive(Debug, Serialize)]
struct CreatePreferenceBody {
    items: Vec<PreferenceItem>,
    payer: PayerBody,
    back_urls: BackUrls,
    auto_return: &'static str,
    external_reference: String,
    notification_url: String,
}

#[derive(Debug, Serialize)]
struct PayerBody {
    name: String,
    email: String,
    phone: PhoneBody,
    address: AddressBody,
}

#[derive(Debug, Serialize)]
struct PhoneBody {
    area_code: String,
    number: String,
}

#[derive(Debug, Serialize)]
struct AddressBody {
    zip_code: String,
    street_name: String,
    street_number: String,
}

impl From<&PreferenceRequest> for CreatePreferenceBody {
    fn from(request: &PreferenceRequest) -> Self {
        Self {
            items: request.items.clone(),
            payer: PayerBody {
                name: request.payer.name.clone(),
                email: request.payer.email.clone(),
                phone: PhoneBody {
                    area_code: request.payer.phone.area_code.clone(),
                    number: request.payer.phone.number.clone(),
                },
                address: AddressBody {
                    zip_code: request.payer.address.zip_code.clone(),
                    street_name: request.payer.address.street_name.clone(),
                    street_number: request.payer.address.street_number.clone(),
                },
            },
            back_urls: request.back_urls.clone(),
            auto_return: "approved",
            external_reference: request.external_reference.to_string(),
            notification_url: request.notification_url.clone(),
        }
    }
}

/// Response body for `GET /v1/payments/{id}`.
#[derive(Debug, Deserialize)]
struct PaymentResponse {
    id: i64,
    status: PaymentStatus,
    status_detail: Option<String>,
    external_reference: Option<String>,
    transaction_amount: Option<Decimal>,
    payer: Option<PaymentPayer>,
}

#[derive(Debug, Deserialize)]
struct PaymentPayer {
    email: Option<String>,
}

impl From<PaymentResponse> for Payment {
    fn from(response: PaymentResponse) -> Self {
        Self {
            id: response.id,
            status: response.status,
            status_detail: response.status_detail,
            external_reference: response.external_reference.map(Into::into),
            transaction_amount: response.transaction_amount,
            payer_email: response.payer.and_then(|payer| payer.email),
        }
    }
}
