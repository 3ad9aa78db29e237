//! Application state shared across handlers.

use std::sync::Arc;

use crate::checkout::CheckoutStash;
use crate::config::StorefrontConfig;
use crate::services::{
    GatewayError, Mailer, MercadoPagoClient, PaymentGateway, SmtpMailer,
};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("gateway client error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("SMTP configuration error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the gateway client, the mailer, and the checkout
/// stash.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    gateway: Arc<dyn PaymentGateway>,
    mailer: Arc<dyn Mailer>,
    stash: CheckoutStash,
}

impl AppState {
    /// Create the production application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway client or SMTP relay cannot be
    /// configured.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let gateway = Arc::new(MercadoPagoClient::new(&config.mercado_pago)?);
        let mailer = Arc::new(SmtpMailer::new(&config.email)?);

        Ok(Self::with_services(config, gateway, mailer))
    }

    /// Create state with explicit service implementations.
    ///
    /// Integration tests use this to substitute in-process fakes for the
    /// gateway and mailer.
    #[must_use]
    pub fn with_services(
        config: StorefrontConfig,
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                gateway,
                mailer,
                stash: CheckoutStash::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the payment gateway.
    #[must_use]
    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.inner.gateway.as_ref()
    }

    /// Get a reference to the mailer.
    #[must_use]
    pub fn mailer(&self) -> &dyn Mailer {
        self.inner.mailer.as_ref()
    }

    /// Get a reference to the checkout stash.
    #[must_use]
    pub fn stash(&self) -> &CheckoutStash {
        &self.inner.stash
    }
}
