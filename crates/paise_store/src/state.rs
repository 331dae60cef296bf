//! `StateStore` — the raw, partition-explicit state protocol.
//!
//! Hosts never talk to this trait directly; [`crate::StateStore`]
//! implementations are wrapped by a host facade that prefixes every key
//! with the caller's `PluginIdentity` (see `paise_host`). Only the core
//! (the orchestrator and the configuration subsystem) uses explicit
//! partitions, to persist the `_system.configuration` diff baseline.

use crate::error::StoreError;
use paise_model::PluginIdentity;
use serde_json::Value;

/// A single versioned entry as stored by a `StateStore`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateEntry {
    /// The stored value.
    pub value: Value,
    /// The entry's version. Writes without an explicit version default to 1.
    pub version: u64,
}

/// Partitioned, versioned key-value storage.
///
/// Implementations must be safe for concurrent use: multiple hosts across
/// multiple worker threads may call `get`/`set` for different partitions
/// (or, for the reserved `_system` partition, the orchestrator) at the same
/// time.
pub trait StateStore: Send + Sync {
    /// Writes `value` under `(partition, key)` with an explicit `version`.
    fn set_versioned(
        &self,
        partition: &PluginIdentity,
        key: &str,
        value: Value,
        version: u64,
    ) -> Result<(), StoreError>;

    /// Writes `value` under `(partition, key)` with the default version (`1`).
    fn set(&self, partition: &PluginIdentity, key: &str, value: Value) -> Result<(), StoreError> {
        self.set_versioned(partition, key, value, 1)
    }

    /// Reads the entry at `(partition, key)`, if any.
    fn get_versioned(
        &self,
        partition: &PluginIdentity,
        key: &str,
    ) -> Result<Option<StateEntry>, StoreError>;

    /// Reads the value at `(partition, key)`, discarding its version.
    fn get(&self, partition: &PluginIdentity, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.get_versioned(partition, key)?.map(|e| e.value))
    }

    /// Removes the entry at `(partition, key)`.
    fn remove(&self, partition: &PluginIdentity, key: &str) -> Result<(), StoreError>;

    /// Returns every `(key, entry)` in `partition` whose version is strictly
    /// less than `version`. Used to support plugin-upgrade re-indexing.
    fn entries_below_version(
        &self,
        partition: &PluginIdentity,
        version: u64,
    ) -> Result<Vec<(String, StateEntry)>, StoreError>;

    /// Clears every entry in `partition`. Used by `reset_action`.
    fn clear_partition(&self, partition: &PluginIdentity) -> Result<(), StoreError>;
}
