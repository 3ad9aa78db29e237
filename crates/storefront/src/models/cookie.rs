//! Cart cookie codec.
//!
//! The authoritative cart lives in a single cookie: a URL-encoded JSON array
//! of cart lines, rewritten wholesale on every mutation. Reads are tolerant -
//! a missing cookie, undecodable value, bad JSON, or non-array all degrade to
//! an empty cart, never an error.
//!
//! Cookie contract: name `cart`, `Path=/`, `HttpOnly`, `SameSite=Lax`,
//! `Max-Age=604800` (7 days).

use axum::http::{HeaderMap, HeaderValue, header};

use sabia_core::Cart;

/// Cookie holding the serialized cart.
pub const CART_COOKIE: &str = "cart";

/// Cart cookie lifetime: 7 days.
const CART_COOKIE_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// Extract a cookie value from request headers.
fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;

            if key == name {
                Some(value.to_string())
            } else {
                None
            }
        })
}

/// Read the cart from the request's cookie header.
///
/// Any malformed value - undecodable percent-encoding, invalid JSON, or a
/// JSON value that is not an array of cart lines - reads as an empty cart.
#[must_use]
pub fn read_cart(headers: &HeaderMap) -> Cart {
    let Some(raw) = extract_cookie(headers, CART_COOKIE) else {
        return Cart::new();
    };

    let Ok(decoded) = urlencoding::decode(&raw) else {
        return Cart::new();
    };

    serde_json::from_str(&decoded).unwrap_or_default()
}

/// Build the `Set-Cookie` header value for a cart.
///
/// The value is the URL-encoded JSON array; attributes follow the cookie
/// contract above. Serialization of a cart cannot realistically fail; if it
/// ever does the cookie is reset to an empty list.
#[must_use]
pub fn cart_cookie_header(cart: &Cart) -> HeaderValue {
    let json = serde_json::to_string(cart).unwrap_or_else(|_| "[]".to_string());
    let encoded = urlencoding::encode(&json);

    let cookie = format!(
        "{CART_COOKIE}={encoded}; HttpOnly; SameSite=Lax; Path=/; Max-Age={CART_COOKIE_MAX_AGE_SECS}"
    );

    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}
