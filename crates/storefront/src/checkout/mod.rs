//! Checkout: pricing, the temporary stash, and preference assembly.

pub mod pricing;
pub mod stash;

pub use pricing::{CheckoutTotals, Discount, calculate_shipping};
pub use stash::{CheckoutStash, StashEntry};

use rust_decimal::Decimal;
use url::Url;

use sabia_core::Cart;

use crate::services::PreferenceItem;

/// Build the hosted-checkout line items for a cart.
///
/// One line per cart line, plus a synthetic "Frete" line when shipping is
/// charged and a synthetic negative "Desconto" line when a coupon applies,
/// so the hosted page totals match what the customer saw.
#[must_use]
pub fn preference_items(cart: &Cart, totals: &CheckoutTotals) -> Vec<PreferenceItem> {
    let mut items: Vec<PreferenceItem> = cart
        .items()
        .iter()
        .map(|item| PreferenceItem {
            title: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.price,
            currency_id: "BRL".to_string(),
            picture_url: Some(item.image.clone()),
        })
        .collect();

    if totals.shipping > Decimal::ZERO {
        items.push(PreferenceItem::synthetic("Frete", totals.shipping));
    }
    if totals.discount > Decimal::ZERO {
        items.push(PreferenceItem::synthetic("Desconto", -totals.discount));
    }

    items
}

/// Whether a hosted checkout URL belongs to one of the allow-listed origins.
///
/// Open-redirect guard: the URL handed back by the gateway is only returned
/// to the browser when its scheme, host, and port match an allow-listed
/// origin exactly.
#[must_use]
pub fn is_allowed_checkout_url(url: &str, allowed_origins: &[String]) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    allowed_origins.iter().any(|origin| {
        Url::parse(origin).is_ok_and(|allowed| {
            parsed.scheme() == allowed.scheme()
                && parsed.host_str() == allowed.host_str()
                && parsed.port_or_known_default() == allowed.port_or_known_default()
        })
    })
}
