//! Auto-partitioning wrappers over the raw `StateStore`/`Cache` protocols.

use paise_model::{CacheId, PaiseError, PluginIdentity};
use paise_store::{Cache, StateEntry, StateStore};
use serde_json::Value;
use std::sync::Arc;

/// State access scoped to one plugin's partition. Every call is prefixed
/// with the owning `PluginIdentity`; there is no way to reach another
/// plugin's partition, or the reserved `_system` partition, through this type.
#[derive(Clone)]
pub struct StateHandle {
    store: Arc<dyn StateStore>,
    identity: PluginIdentity,
}

impl StateHandle {
    pub(crate) fn new(store: Arc<dyn StateStore>, identity: PluginIdentity) -> Self {
        Self { store, identity }
    }

    pub fn get(&self, key: &str, default: Value) -> Result<Value, PaiseError> {
        Ok(self.store.get(&self.identity, key)?.unwrap_or(default))
    }

    pub fn get_opt(&self, key: &str) -> Result<Option<Value>, PaiseError> {
        Ok(self.store.get(&self.identity, key)?)
    }

    pub fn set(&self, key: &str, value: Value) -> Result<(), PaiseError> {
        Ok(self.store.set(&self.identity, key, value)?)
    }

    pub fn set_versioned(&self, key: &str, value: Value, version: u64) -> Result<(), PaiseError> {
        Ok(self.store.set_versioned(&self.identity, key, value, version)?)
    }

    pub fn remove(&self, key: &str) -> Result<(), PaiseError> {
        Ok(self.store.remove(&self.identity, key)?)
    }

    pub fn entries_below_version(&self, version: u64) -> Result<Vec<(String, StateEntry)>, PaiseError> {
        Ok(self.store.entries_below_version(&self.identity, version)?)
    }

    /// Clears every entry in this plugin's state partition. Used by
    /// `reset_action` implementations.
    pub fn clear(&self) -> Result<(), PaiseError> {
        Ok(self.store.clear_partition(&self.identity)?)
    }
}

/// Cache access scoped to one plugin's partition.
#[derive(Clone)]
pub struct CacheHandle {
    cache: Arc<dyn Cache>,
    identity: PluginIdentity,
}

impl CacheHandle {
    pub(crate) fn new(cache: Arc<dyn Cache>, identity: PluginIdentity) -> Self {
        Self { cache, identity }
    }

    pub fn put(&self, bytes: Vec<u8>) -> Result<CacheId, PaiseError> {
        Ok(self.cache.put(&self.identity, bytes)?)
    }

    pub fn get(&self, id: &CacheId) -> Result<Option<Vec<u8>>, PaiseError> {
        Ok(self.cache.get(id)?)
    }

    pub fn remove(&self, id: &CacheId) -> Result<(), PaiseError> {
        Ok(self.cache.remove(id)?)
    }

    pub fn remove_all(&self, ids: &[CacheId]) -> Result<(), PaiseError> {
        Ok(self.cache.remove_all(ids)?)
    }

    /// Clears every entry in this plugin's cache partition. Used by
    /// `reset_action` implementations.
    pub fn clear(&self) -> Result<(), PaiseError> {
        Ok(self.cache.clear_partition(&self.identity)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paise_store::InMemoryStateStore;

    #[test]
    fn partitions_isolate_by_identity() {
        let store: Arc<dyn StateStore> = Arc::new(InMemoryStateStore::default());
        let a = StateHandle::new(Arc::clone(&store), PluginIdentity::new("p.a"));
        let b = StateHandle::new(Arc::clone(&store), PluginIdentity::new("p.b"));
        a.set("seen", Value::from(1)).unwrap();
        b.set("seen", Value::from(2)).unwrap();
        assert_eq!(a.get("seen", Value::Null).unwrap(), Value::from(1));
        assert_eq!(b.get("seen", Value::Null).unwrap(), Value::from(2));
    }
}
