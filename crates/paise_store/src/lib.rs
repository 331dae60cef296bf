//! Partitioned persistence primitives consumed by hosts: [`StateStore`],
//! [`Cache`], and [`DataStore`].
//!
//! These are the raw, explicit-partition protocols. Plugin-facing
//! partitioning (prefixing every key with the caller's `PluginIdentity`) is
//! applied one layer up, by the host facades in `paise_host`.

/// Partitioned byte-blob cache.
pub mod cache;
/// The durable item index.
pub mod data;
/// Shared store error type.
pub mod error;
/// In-memory reference implementations for the `test` profile.
pub mod memory;
/// Partitioned, versioned key-value state.
pub mod state;

pub use cache::Cache;
pub use data::DataStore;
pub use error::StoreError;
pub use memory::{InMemoryCache, InMemoryDataStore, InMemoryStateStore};
pub use state::{StateEntry, StateStore};
