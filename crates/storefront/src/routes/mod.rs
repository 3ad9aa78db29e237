//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Cart (cookie-backed)
//! GET  /api/cart               - Read the cart
//! POST /api/cart               - Mutate (action: add|remove|update|clear)
//! PUT  /api/cart               - Full replace (client store background sync)
//!
//! # Checkout
//! POST /api/checkout           - Build a hosted-checkout preference
//!
//! # Webhooks
//! POST /api/webhooks/payment   - Payment gateway notification
//! ```

pub mod cart;
pub mod checkout;
pub mod webhook;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/cart",
            get(cart::show).post(cart::mutate).put(cart::replace),
        )
        .route("/api/checkout", post(checkout::create))
        .route("/api/webhooks/payment", post(webhook::notify))
}
