//! HTTP client for the storefront cart endpoint.
//!
//! The server's cart is keyed by a cookie, so the client keeps a cookie jar
//! across requests. Replace calls carry the full item list - the server
//! rewrites its cookie wholesale, last write wins.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sabia_core::CartItem;

/// Errors that can occur when syncing with the cart endpoint.
#[derive(Debug, Error)]
pub enum SyncError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Client for the storefront's `/api/cart` resource.
#[derive(Clone)]
pub struct CartApi {
    inner: Arc<CartApiInner>,
}

struct CartApiInner {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CartEnvelope {
    #[allow(dead_code)]
    success: bool,
    cart: Vec<CartItem>,
}

#[derive(Debug, Serialize)]
struct ReplaceBody<'a> {
    items: &'a [CartItem],
}

impl CartApi {
    /// Create a cart API client for the given storefront base URL.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            inner: Arc::new(CartApiInner {
                client,
                base_url: base_url.into().trim_end_matches('/').to_string(),
            }),
        })
    }

    fn url(&self) -> String {
        format!("{}/api/cart", self.inner.base_url)
    }

    /// Fetch the server's cart.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the request fails or the response is not the
    /// expected envelope.
    pub async fn fetch_cart(&self) -> Result<Vec<CartItem>, SyncError> {
        let response = self.inner.client.get(self.url()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: CartEnvelope = response.json().await?;
        Ok(envelope.cart)
    }

    /// Replace the server's cart with the full local list.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the request fails. Callers on the mutation
    /// path log and swallow this - the optimistic local state stands.
    pub async fn replace_cart(&self, items: &[CartItem]) -> Result<(), SyncError> {
        let response = self
            .inner
            .client
            .put(self.url())
            .json(&ReplaceBody { items })
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SyncError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
