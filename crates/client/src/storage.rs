//! Local cart state persistence.
//!
//! The local-storage analog: cart state is a single JSON file, written on
//! every mutation and read back when the store is constructed. Write
//! failures are logged and otherwise ignored - local persistence is
//! best-effort, exactly like the in-memory cart it backs.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use sabia_core::CartItem;

/// Serialized shape of the persisted store state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub items: Vec<CartItem>,
    pub is_open: bool,
}

/// A JSON state file holding the persisted cart.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    /// Create a state file handle. Nothing is touched on disk until the
    /// first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted state.
    ///
    /// A missing file or an unreadable/unparseable one loads as `None`;
    /// the store then starts empty.
    #[must_use]
    pub fn load(&self) -> Option<PersistedState> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Discarding unreadable cart state file"
                );
                None
            }
        }
    }

    /// Persist the state, creating parent directories as needed.
    ///
    /// Failures are logged, never surfaced - the in-memory cart stays
    /// authoritative for this process either way.
    pub fn save(&self, state: &PersistedState) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to create cart state directory"
                );
                return;
            }
        }

        let json = match serde_json::to_string(state) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize cart state");
                return;
            }
        };

        if let Err(e) = fs::write(&self.path, json) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to write cart state file"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sabia_core::NewCartItem;

    use super::*;

    fn sample_items() -> Vec<CartItem> {
        vec![
            NewCartItem {
                id: "p1".to_string(),
                name: "Caneca Sabiá".to_string(),
                price: "59.90".parse().unwrap(),
                image: "https://cdn.example.com/caneca.jpg".to_string(),
                slug: "caneca-sabia".to_string(),
                stock: 10,
            }
            .with_quantity(2),
        ]
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("cart.json"));

        let state = PersistedState {
            items: sample_items(),
            is_open: true,
        };
        file.save(&state);

        assert_eq!(file.load(), Some(state));
    }

    #[test]
    fn missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("missing.json"));

        assert_eq!(file.load(), None);
    }

    #[test]
    fn corrupt_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, "not-json").unwrap();

        assert_eq!(StateFile::new(path).load(), None);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let file = StateFile::new(dir.path().join("nested/state/cart.json"));

        file.save(&PersistedState::default());
        assert_eq!(file.load(), Some(PersistedState::default()));
    }
}
