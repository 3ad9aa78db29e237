//! Domain models for the storefront server.
//!
//! The cart itself lives in `sabia-core`; this module holds the server-side
//! representations - currently the cart cookie codec.

pub mod cookie;

pub use cookie::{CART_COOKIE, cart_cookie_header, read_cart};
