//! The optimistic cart store.
//!
//! Mutations apply in memory first, persist to the local state file, and
//! fire a background sync carrying the full list to the server. The sync is
//! unacknowledged: no retry, no backoff, no de-duplication of rapid
//! successive calls. Under rapid clicking, syncs can race and the last
//! write to land wins server-side.

use rust_decimal::Decimal;

use sabia_core::{Cart, CartItem, NewCartItem};

use crate::storage::{PersistedState, StateFile};
use crate::sync::CartApi;

/// Locally-owned cart state plus the UI-open flag.
pub struct CartStore {
    cart: Cart,
    is_open: bool,
    state_file: StateFile,
    api: CartApi,
}

impl CartStore {
    /// Create a store, rehydrating any state persisted by a previous run.
    #[must_use]
    pub fn new(state_file: StateFile, api: CartApi) -> Self {
        let persisted = state_file.load().unwrap_or_default();

        Self {
            cart: Cart::sanitized(persisted.items),
            is_open: persisted.is_open,
            state_file,
            api,
        }
    }

    // =========================================================================
    // Cart mutations (optimistic; each persists and fires a background sync)
    // =========================================================================

    /// Add a product; increments an existing line up to its stock cap.
    pub fn add_item(&mut self, item: NewCartItem) {
        self.cart.add(item);
        self.after_mutation();
    }

    /// Remove the line with the given product id.
    pub fn remove_item(&mut self, id: &str) {
        self.cart.remove(id);
        self.after_mutation();
    }

    /// Set a line's quantity; zero removes the line.
    pub fn update_quantity(&mut self, id: &str, quantity: u32) {
        self.cart.set_quantity(id, quantity);
        self.after_mutation();
    }

    /// Empty the cart.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.after_mutation();
    }

    /// Full replace, used by [`CartStore::hydrate`]. Drops entries missing
    /// an id or carrying a zero quantity. Persists locally but does not
    /// sync - the list just came from (or is headed to) the server.
    pub fn set_items(&mut self, items: Vec<CartItem>) {
        self.cart = Cart::sanitized(items);
        self.persist();
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn get_total_items(&self) -> u32 {
        self.cart.total_items()
    }

    /// Sum of `price * quantity` across all lines.
    #[must_use]
    pub fn get_total_price(&self) -> Decimal {
        self.cart.total_price()
    }

    // =========================================================================
    // UI flag
    // =========================================================================

    /// Whether the cart drawer is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// Open the cart drawer.
    pub fn open(&mut self) {
        self.is_open = true;
        self.persist();
    }

    /// Close the cart drawer.
    pub fn close(&mut self) {
        self.is_open = false;
        self.persist();
    }

    // =========================================================================
    // Server reconciliation
    // =========================================================================

    /// Pull the server's cart and overwrite the local store with it.
    ///
    /// Last-fetch-wins: local additions made before this completes can be
    /// lost. On fetch failure the local state is left untouched (stale
    /// local state persists) and the error is only logged.
    pub async fn hydrate(&mut self) {
        match self.api.fetch_cart().await {
            Ok(items) => {
                self.set_items(items);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cart hydrate failed; keeping local state");
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Persist locally, then fire the unawaited background sync.
    fn after_mutation(&self) {
        self.persist();

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No async runtime; skipping background cart sync");
            return;
        };

        let api = self.api.clone();
        let items = self.cart.items().to_vec();
        handle.spawn(async move {
            if let Err(e) = api.replace_cart(&items).await {
                tracing::warn!(error = %e, "Background cart sync failed");
            }
        });
    }

    fn persist(&self) {
        self.state_file.save(&PersistedState {
            items: self.cart.items().to_vec(),
            is_open: self.is_open,
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_api() -> CartApi {
        // Points at a closed port: background syncs fail and are swallowed,
        // which is exactly the optimistic contract under test.
        CartApi::new("http://127.0.0.1:9").unwrap()
    }

    fn test_store(dir: &tempfile::TempDir) -> CartStore {
        CartStore::new(StateFile::new(dir.path().join("cart.json")), test_api())
    }

    fn item(id: &str, price: &str, stock: u32) -> NewCartItem {
        NewCartItem {
            id: id.to_string(),
            name: format!("Produto {id}"),
            price: price.parse().unwrap(),
            image: format!("https://cdn.example.com/{id}.jpg"),
            slug: format!("produto-{id}"),
            stock,
        }
    }

    #[tokio::test]
    async fn mutations_are_applied_optimistically() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = test_store(&dir);

        store.add_item(item("p1", "10.00", 5));
        store.add_item(item("p1", "10.00", 5));
        store.add_item(item("p2", "25.50", 2));

        assert_eq!(store.get_total_items(), 3);
        assert_eq!(store.get_total_price(), "45.50".parse().unwrap());

        store.update_quantity("p1", 0);
        assert_eq!(store.items().len(), 1);

        store.clear_cart();
        assert!(store.items().is_empty());
    }

    #[tokio::test]
    async fn stock_cap_holds_across_repeated_adds() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = test_store(&dir);

        for _ in 0..10 {
            store.add_item(item("p1", "10.00", 3));
        }

        assert_eq!(store.get_total_items(), 3);
    }

    #[tokio::test]
    async fn state_survives_store_restart() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut store = test_store(&dir);
            store.add_item(item("p1", "10.00", 5));
            store.open();
        }

        let store = test_store(&dir);
        assert_eq!(store.items().len(), 1);
        assert!(store.is_open());
    }

    #[tokio::test]
    async fn set_items_drops_invalid_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = test_store(&dir);

        store.set_items(vec![
            item("p1", "10.00", 5).with_quantity(2),
            item("", "10.00", 5).with_quantity(1),
            item("p2", "10.00", 5).with_quantity(0),
        ]);

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].id, "p1");
    }

    #[tokio::test]
    async fn hydrate_failure_keeps_local_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = test_store(&dir);
        store.add_item(item("p1", "10.00", 5));

        // The test API points at a closed port, so the fetch fails.
        store.hydrate().await;

        assert_eq!(store.items().len(), 1);
    }
}
