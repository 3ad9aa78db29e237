//! External service integrations for the storefront.
//!
//! Each integration exposes a narrow trait (the seam the handlers are
//! written against) plus its production implementation:
//!
//! - [`gateway`] / [`mercadopago`] - hosted checkout and payment lookup
//! - [`email`] - transactional order emails over SMTP

pub mod email;
pub mod gateway;
pub mod mercadopago;

pub use email::{EmailError, Mailer, OrderEmail, OrderEmailKind, SmtpMailer};
pub use gateway::{
    BackUrls, GatewayError, Payment, PaymentGateway, Preference, PreferenceItem,
    PreferenceRequest,
};
pub use mercadopago::MercadoPagoClient;
