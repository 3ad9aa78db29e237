//! Cart items and the pure list operations shared by client and server.
//!
//! A cart is a flat list of [`CartItem`] lines keyed by product id. Display
//! metadata (`name`, `image`, `slug`) and `price` are copied at add-time and
//! never re-fetched; `stock` is an add-time snapshot used only as the upper
//! bound for the increment path.
//!
//! # Invariants
//!
//! - `quantity >= 1` for every stored line; an update that would take a
//!   quantity to zero removes the line instead.
//! - `id` is unique across the list - the same product never occupies two
//!   lines.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identifier, unique within a cart.
    pub id: String,
    /// Product display name, copied at add-time.
    pub name: String,
    /// Unit price in BRL, copied at add-time (not re-validated against the
    /// current catalog price).
    pub price: Decimal,
    /// Product image URL, copied at add-time.
    pub image: String,
    /// Product page slug, copied at add-time.
    pub slug: String,
    /// Stock level snapshot at add-time; upper bound for the increment path.
    pub stock: u32,
    /// Line quantity; always `>= 1` while the line exists.
    pub quantity: u32,
}

impl CartItem {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Add-to-cart payload: a [`CartItem`] without a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    /// Product identifier.
    pub id: String,
    /// Product display name.
    pub name: String,
    /// Unit price in BRL.
    pub price: Decimal,
    /// Product image URL.
    pub image: String,
    /// Product page slug.
    pub slug: String,
    /// Stock level snapshot.
    pub stock: u32,
}

impl NewCartItem {
    /// Promote to a stored line with the given quantity.
    #[must_use]
    pub fn with_quantity(self, quantity: u32) -> CartItem {
        CartItem {
            id: self.id,
            name: self.name,
            price: self.price,
            image: self.image,
            slug: self.slug,
            stock: self.stock,
            quantity,
        }
    }
}

/// An ordered list of cart lines.
///
/// Serializes transparently as a JSON array, which is the shape stored in
/// the cart cookie and exchanged with the client store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create a cart from trusted lines (e.g., a previously serialized cart).
    #[must_use]
    pub const fn from_items(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    /// Create a cart from untrusted lines, dropping any entry with an empty
    /// `id` or a zero `quantity`.
    ///
    /// Used by the client store's full replace so a bad server response can
    /// never violate the list invariants.
    #[must_use]
    pub fn sanitized(items: Vec<CartItem>) -> Self {
        Self {
            items: items
                .into_iter()
                .filter(|item| !item.id.is_empty() && item.quantity > 0)
                .collect(),
        }
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consume the cart, returning its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of lines (not total quantity).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Look up a line by product id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Add a product to the cart.
    ///
    /// If a line with the same `id` exists and its quantity is below the
    /// stock snapshot, the quantity is incremented by one. A line already at
    /// its stock cap is left untouched - the caller is not told, matching
    /// the silent no-op contract. Otherwise a new line is appended with
    /// quantity 1.
    pub fn add(&mut self, new: NewCartItem) {
        if let Some(existing) = self.items.iter_mut().find(|item| item.id == new.id) {
            if existing.quantity < existing.stock {
                existing.quantity += 1;
            }
            return;
        }
        self.items.push(new.with_quantity(1));
    }

    /// Remove the line with the given product id; no-op when absent.
    pub fn remove(&mut self, id: &str) {
        self.items.retain(|item| item.id != id);
    }

    /// Set a line's quantity verbatim.
    ///
    /// A quantity of zero removes the line. No stock cap is enforced here -
    /// only [`Cart::add`]'s increment path checks stock. No-op when the id
    /// is absent.
    pub fn set_quantity(&mut self, id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.quantity = quantity;
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of `price * quantity` across all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

impl IntoIterator for Cart {
    type Item = CartItem;
    type IntoIter = std::vec::IntoIter<CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
