//! Checkout pricing: subtotal, shipping, and coupon discounts.
//!
//! Everything here is a pure function of the cart and the coupon - no live
//! carrier rate lookups, no catalog re-validation. Shipping is a flat step
//! function: free at or above the threshold, a flat fee below it.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sabia_core::Cart;

/// Subtotal at or above this ships free (BRL).
const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// Flat shipping fee below the threshold (BRL).
const FLAT_SHIPPING_FEE: Decimal = Decimal::from_parts(40, 0, 0, false, 0);

/// Shipping cost for a given subtotal.
#[must_use]
pub fn calculate_shipping(subtotal: Decimal) -> Decimal {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        FLAT_SHIPPING_FEE
    }
}

/// A coupon's effect on the subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Discount {
    /// Percentage off the subtotal (e.g., 10 means 10%).
    Percent(Decimal),
    /// Fixed BRL amount off the subtotal.
    Fixed(Decimal),
}

/// A coupon value string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid discount value '{0}': expected a percentage like '10%' or a fixed amount like '40.00'")]
pub struct ParseDiscountError(String);

impl FromStr for Discount {
    type Err = ParseDiscountError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if let Some(percent) = value.strip_suffix('%') {
            let percent: Decimal = percent
                .trim()
                .parse()
                .map_err(|_| ParseDiscountError(value.to_string()))?;
            if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
                return Err(ParseDiscountError(value.to_string()));
            }
            return Ok(Self::Percent(percent));
        }

        let amount: Decimal = value
            .parse()
            .map_err(|_| ParseDiscountError(value.to_string()))?;
        if amount < Decimal::ZERO {
            return Err(ParseDiscountError(value.to_string()));
        }
        Ok(Self::Fixed(amount))
    }
}

impl Discount {
    /// The BRL amount this discount takes off the given subtotal.
    ///
    /// Percentages are rounded to centavos; fixed amounts are clamped to the
    /// subtotal so the discount can never exceed what is being discounted.
    #[must_use]
    pub fn amount_off(&self, subtotal: Decimal) -> Decimal {
        match self {
            Self::Percent(percent) => {
                (subtotal * *percent / Decimal::ONE_HUNDRED).round_dp(2)
            }
            Self::Fixed(amount) => (*amount).min(subtotal),
        }
    }
}

/// The money breakdown of a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl CheckoutTotals {
    /// Compute the totals for a cart with an optional coupon discount.
    #[must_use]
    pub fn compute(cart: &Cart, discount: Option<&Discount>) -> Self {
        let subtotal = cart.total_price();
        let shipping = calculate_shipping(subtotal);
        let discount = discount.map_or(Decimal::ZERO, |d| d.amount_off(subtotal));

        Self {
            subtotal,
            shipping,
            discount,
            total: subtotal + shipping - discount,
        }
    }
}
