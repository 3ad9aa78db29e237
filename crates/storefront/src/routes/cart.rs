//! Cart route handlers.
//!
//! The cart lives in a cookie (see [`crate::models::cookie`]); every
//! successful mutation rewrites it wholesale and returns the new list.
//! Validation failures return 400 with a user-facing message and leave the
//! cookie untouched - partial application is never committed.

use axum::{
    Json,
    http::{HeaderMap, header},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sabia_core::{Cart, CartItem, NewCartItem};

use crate::error::{AppError, Result};
use crate::models::{cart_cookie_header, read_cart};

/// Response envelope for all cart operations.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub success: bool,
    pub cart: Cart,
}

/// Mutation request: one action applied to the current cookie cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartActionRequest {
    pub action: String,
    #[serde(default)]
    pub product: Option<serde_json::Value>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
}

/// Full-replace request used by the client store's background sync.
#[derive(Debug, Deserialize)]
pub struct CartReplaceRequest {
    pub items: Vec<CartItem>,
}

/// Read the current cart.
#[instrument(skip_all)]
pub async fn show(headers: HeaderMap) -> Json<CartResponse> {
    let cart = read_cart(&headers);
    Json(CartResponse {
        success: true,
        cart,
    })
}

/// Apply one mutation to the cart and rewrite the cookie.
#[instrument(skip_all, fields(action = %request.action))]
pub async fn mutate(
    headers: HeaderMap,
    Json(request): Json<CartActionRequest>,
) -> Result<Response> {
    let mut cart = read_cart(&headers);
    apply_action(&mut cart, &request)?;
    Ok(cart_response(cart))
}

/// Replace the whole cart (the client store's background sync target).
///
/// Entries missing an id or carrying a zero quantity are dropped rather
/// than rejected - the sync is fire-and-forget on the client side, so a
/// partially bad list still lands.
#[instrument(skip_all)]
pub async fn replace(Json(request): Json<CartReplaceRequest>) -> Response {
    let cart = Cart::sanitized(request.items);
    cart_response(cart)
}

/// Rewrite the cookie and return the new list.
fn cart_response(cart: Cart) -> Response {
    let set_cookie = cart_cookie_header(&cart);
    (
        AppendHeaders([(header::SET_COOKIE, set_cookie)]),
        Json(CartResponse {
            success: true,
            cart,
        }),
    )
        .into_response()
}

/// Apply a single action, validating its required fields first.
fn apply_action(cart: &mut Cart, request: &CartActionRequest) -> Result<()> {
    match request.action.as_str() {
        "add" => {
            let product = request
                .product
                .clone()
                .ok_or_else(|| AppError::BadRequest("Produto inválido".to_string()))?;
            let product: NewCartItem = serde_json::from_value(product)
                .map_err(|_| AppError::BadRequest("Produto inválido".to_string()))?;
            if product.id.is_empty() {
                return Err(AppError::BadRequest("Produto inválido".to_string()));
            }
            cart.add(product);
        }
        "remove" => {
            let product_id = required_product_id(request)?;
            cart.remove(&product_id);
        }
        "update" => {
            let product_id = required_product_id(request)?;
            let quantity = request
                .quantity
                .and_then(|quantity| u32::try_from(quantity).ok())
                .ok_or_else(|| AppError::BadRequest("Quantidade inválida".to_string()))?;
            cart.set_quantity(&product_id, quantity);
        }
        "clear" => cart.clear(),
        _ => return Err(AppError::BadRequest("Ação inválida".to_string())),
    }
    Ok(())
}

fn required_product_id(request: &CartActionRequest) -> Result<String> {
    request
        .product_id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Produto não informado".to_string()))
}
