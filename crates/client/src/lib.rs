//! Sabiá client cart store.
//!
//! An optimistic, locally-persisted cart for embedding in a Sabiá frontend
//! process. Mutations apply to the in-memory cart immediately, persist to a
//! local JSON state file, and fire a best-effort background sync to the
//! storefront's cart endpoint - the UI never waits on the network and never
//! sees a sync failure.
//!
//! # Consistency
//!
//! There is no single source of truth between this store and the server's
//! cookie cart. Syncs are unordered and fire-and-forget (last write wins
//! server-side), and [`store::CartStore::hydrate`] overwrites local state
//! with whatever the server returns. This mirrors the storefront's accepted
//! consistency model; it is not a bug to fix here.
//!
//! # Modules
//!
//! - [`store`] - the cart store itself
//! - [`storage`] - local JSON state file (the local-storage analog)
//! - [`sync`] - HTTP client for the storefront cart endpoint

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod storage;
pub mod store;
pub mod sync;

pub use storage::StateFile;
pub use store::CartStore;
pub use sync::{CartApi, SyncError};
