//! Temporary checkout stash.
//!
//! Correlates a payment webhook with the cart and customer data captured
//! when the preference was built. Entries live in process memory only:
//! a restart loses them, and a webhook that finds no entry skips the email
//! step. Entries older than one hour are swept on every insert.
//!
//! Process-local by design - the single seam a durable implementation
//! (a table keyed by order reference) would replace.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use sabia_core::{Cart, CustomerData, OrderReference};

use crate::checkout::pricing::CheckoutTotals;

/// Entries older than this are deleted on each insert.
const STASH_TTL: Duration = Duration::from_secs(60 * 60);

/// Checkout data stashed while the gateway resolves the payment.
#[derive(Debug, Clone)]
pub struct StashEntry {
    pub cart: Cart,
    pub customer: CustomerData,
    pub totals: CheckoutTotals,
    created_at: Instant,
}

impl StashEntry {
    fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// Process-local map from order reference to stashed checkout data.
///
/// The mutex is held only for map operations; nothing awaits inside it.
#[derive(Debug, Default)]
pub struct CheckoutStash {
    entries: Mutex<HashMap<OrderReference, StashEntry>>,
}

impl CheckoutStash {
    /// Create an empty stash.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stash checkout data under the given reference, sweeping expired
    /// entries first.
    pub fn insert(
        &self,
        reference: OrderReference,
        cart: Cart,
        customer: CustomerData,
        totals: CheckoutTotals,
    ) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| entry.age() < STASH_TTL);
        entries.insert(
            reference,
            StashEntry {
                cart,
                customer,
                totals,
                created_at: Instant::now(),
            },
        );
    }

    /// Clone the entry for a reference, if present.
    #[must_use]
    pub fn get(&self, reference: &OrderReference) -> Option<StashEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(reference).cloned()
    }

    /// Remove and return the entry for a reference.
    ///
    /// Used for terminal payment statuses so a repeated webhook finds
    /// nothing and no-ops the email step.
    #[must_use]
    pub fn take(&self, reference: &OrderReference) -> Option<StashEntry> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(reference)
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    /// Whether the stash holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert an entry with a back-dated creation time.
    #[cfg(test)]
    pub(crate) fn insert_aged(
        &self,
        reference: OrderReference,
        cart: Cart,
        customer: CustomerData,
        totals: CheckoutTotals,
        age: Duration,
    ) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            reference,
            StashEntry {
                cart,
                customer,
                totals,
                created_at: Instant::now() - age,
            },
        );
    }
}
