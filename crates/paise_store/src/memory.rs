//! In-memory reference implementations of [`StateStore`], [`Cache`], and
//! [`DataStore`], used by the `test` profile and by unit tests throughout
//! the workspace.
//!
//! Grounded in the teacher's `Resources` container (`TypeId`-keyed
//! `HashMap` behind a `parking_lot::RwLock`): here the key is a
//! `(partition, key)` pair instead of a `TypeId`, but the locking
//! discipline is the same — one lock per table, held only across the
//! individual operation.

use crate::cache::Cache;
use crate::data::DataStore;
use crate::error::StoreError;
use crate::state::{StateEntry, StateStore};
use hashbrown::HashMap;
use parking_lot::RwLock;
use paise_model::{CacheId, Content, ItemId, Metadata, MetadataPatch, PluginIdentity};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory `StateStore`. Dropped at process exit; used by the `test`
/// profile and development runs that don't need durability.
#[derive(Default)]
pub struct InMemoryStateStore {
    table: RwLock<HashMap<(PluginIdentity, String), StateEntry>>,
}

impl InMemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for InMemoryStateStore {
    fn set_versioned(
        &self,
        partition: &PluginIdentity,
        key: &str,
        value: Value,
        version: u64,
    ) -> Result<(), StoreError> {
        self.table.write().insert(
            (partition.clone(), key.to_string()),
            StateEntry { value, version },
        );
        Ok(())
    }

    fn get_versioned(
        &self,
        partition: &PluginIdentity,
        key: &str,
    ) -> Result<Option<StateEntry>, StoreError> {
        Ok(self
            .table
            .read()
            .get(&(partition.clone(), key.to_string()))
            .cloned())
    }

    fn remove(&self, partition: &PluginIdentity, key: &str) -> Result<(), StoreError> {
        self.table.write().remove(&(partition.clone(), key.to_string()));
        Ok(())
    }

    fn entries_below_version(
        &self,
        partition: &PluginIdentity,
        version: u64,
    ) -> Result<Vec<(String, StateEntry)>, StoreError> {
        Ok(self
            .table
            .read()
            .iter()
            .filter(|((p, _), entry)| p == partition && entry.version < version)
            .map(|((_, k), entry)| (k.clone(), entry.clone()))
            .collect())
    }

    fn clear_partition(&self, partition: &PluginIdentity) -> Result<(), StoreError> {
        self.table.write().retain(|(p, _), _| p != partition);
        Ok(())
    }
}

/// In-memory `Cache`.
#[derive(Default)]
pub struct InMemoryCache {
    table: RwLock<HashMap<CacheId, (PluginIdentity, Vec<u8>)>>,
    next_id: AtomicU64,
}

impl InMemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&self) -> CacheId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        CacheId::new(format!("cache-{n}"))
    }
}

impl Cache for InMemoryCache {
    fn put(&self, partition: &PluginIdentity, bytes: Vec<u8>) -> Result<CacheId, StoreError> {
        let id = self.fresh_id();
        self.table.write().insert(id.clone(), (partition.clone(), bytes));
        Ok(id)
    }

    fn get(&self, id: &CacheId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.table.read().get(id).map(|(_, bytes)| bytes.clone()))
    }

    fn remove(&self, id: &CacheId) -> Result<(), StoreError> {
        self.table.write().remove(id);
        Ok(())
    }

    fn clear_partition(&self, partition: &PluginIdentity) -> Result<(), StoreError> {
        self.table.write().retain(|_, (p, _)| p != partition);
        Ok(())
    }
}

struct ItemRecord {
    metadata: Metadata,
    content: Option<Content>,
    pending_children: u64,
    cache_ids: Vec<CacheId>,
}

/// In-memory `DataStore`, keyed by `source_url` with a secondary `ItemId` index.
#[derive(Default)]
pub struct InMemoryDataStore {
    by_url: RwLock<HashMap<String, ItemRecord>>,
    url_by_id: RwLock<HashMap<ItemId, String>>,
    next_id: AtomicU64,
}

impl InMemoryDataStore {
    /// Creates an empty data store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&self) -> ItemId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        ItemId::new(format!("item-{n}"))
    }
}

impl DataStore for InMemoryDataStore {
    fn add_item(&self, metadata: Metadata, content: Option<Content>) -> Result<ItemId, StoreError> {
        let url = metadata.source_url.clone();
        let mut by_url = self.by_url.write();
        if let Some(existing) = by_url.get_mut(&url) {
            existing.metadata = existing.metadata.merge(&MetadataPatch {
                title: metadata.title,
                description: metadata.description,
                location: metadata.location,
                parent_id: metadata.parent_id,
                processing_state: Some(metadata.processing_state),
                indexed_at: metadata.indexed_at,
                created_at: metadata.created_at,
                modified_at: metadata.modified_at,
                author: metadata.author,
                tags: metadata.tags,
                mime_type: metadata.mime_type,
                extra: metadata.extra,
                ..Default::default()
            });
            if content.is_some() {
                existing.content = content;
            }
            let id = self
                .url_by_id
                .read()
                .iter()
                .find(|(_, u)| u.as_str() == url)
                .map(|(id, _)| id.clone())
                .expect("existing item must have an id");
            return Ok(id);
        }

        let id = self.fresh_id();
        by_url.insert(
            url.clone(),
            ItemRecord {
                metadata,
                content,
                pending_children: 0,
                cache_ids: Vec::new(),
            },
        );
        self.url_by_id.write().insert(id.clone(), url);
        Ok(id)
    }

    fn get_by_source_url(&self, url: &str) -> Result<Option<Metadata>, StoreError> {
        Ok(self.by_url.read().get(url).map(|r| r.metadata.clone()))
    }

    fn get_by_id(&self, id: &ItemId) -> Result<Option<Metadata>, StoreError> {
        let Some(url) = self.url_by_id.read().get(id).cloned() else {
            return Ok(None);
        };
        self.get_by_source_url(&url)
    }

    fn update_metadata(&self, url: &str, patch: &MetadataPatch) -> Result<Metadata, StoreError> {
        let mut by_url = self.by_url.write();
        let record = by_url
            .get_mut(url)
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;
        record.metadata = record.metadata.merge(patch);
        Ok(record.metadata.clone())
    }

    fn is_terminal(&self, url: &str) -> Result<bool, StoreError> {
        Ok(self
            .by_url
            .read()
            .get(url)
            .is_some_and(|r| r.metadata.processing_state.is_terminal()))
    }

    fn increment_pending_children(&self, url: &str) -> Result<(), StoreError> {
        let mut by_url = self.by_url.write();
        let record = by_url
            .get_mut(url)
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;
        record.pending_children += 1;
        Ok(())
    }

    fn decrement_pending_children(&self, url: &str) -> Result<bool, StoreError> {
        let mut by_url = self.by_url.write();
        let record = by_url
            .get_mut(url)
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;
        record.pending_children = record.pending_children.saturating_sub(1);
        Ok(record.pending_children == 0)
    }

    fn mark_completed(&self, url: &str) -> Result<(), StoreError> {
        let mut by_url = self.by_url.write();
        let record = by_url
            .get_mut(url)
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;
        record.metadata.processing_state = paise_model::ProcessingState::Completed;
        Ok(())
    }

    fn remove_item(&self, url: &str) -> Result<Vec<CacheId>, StoreError> {
        let mut by_url = self.by_url.write();
        let Some(record) = by_url.remove(url) else {
            return Ok(Vec::new());
        };
        self.url_by_id.write().retain(|_, u| u != url);
        Ok(record.cache_ids)
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        self.by_url.write().clear();
        self.url_by_id.write().clear();
        Ok(())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.by_url.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_store_round_trips() {
        let store = InMemoryStateStore::new();
        let p = PluginIdentity::new("p.a");
        store.set(&p, "seen", Value::from(1)).unwrap();
        assert_eq!(store.get(&p, "seen").unwrap(), Some(Value::from(1)));
    }

    #[test]
    fn state_store_partitions_dont_collide() {
        let store = InMemoryStateStore::new();
        let a = PluginIdentity::new("p.a");
        let b = PluginIdentity::new("p.b");
        store.set(&a, "seen", Value::from(1)).unwrap();
        store.set(&b, "seen", Value::from(2)).unwrap();
        assert_eq!(store.get(&a, "seen").unwrap(), Some(Value::from(1)));
        assert_eq!(store.get(&b, "seen").unwrap(), Some(Value::from(2)));
    }

    #[test]
    fn state_store_version_query() {
        let store = InMemoryStateStore::new();
        let p = PluginIdentity::new("p.a");
        store.set_versioned(&p, "k1", Value::from(1), 1).unwrap();
        store.set_versioned(&p, "k2", Value::from(2), 3).unwrap();
        let old = store.entries_below_version(&p, 2).unwrap();
        assert_eq!(old.len(), 1);
        assert_eq!(old[0].0, "k1");
    }

    #[test]
    fn cache_put_get_remove_all() {
        let cache = InMemoryCache::new();
        let p = PluginIdentity::new("p.a");
        let id1 = cache.put(&p, vec![1, 2, 3]).unwrap();
        let id2 = cache.put(&p, vec![4, 5]).unwrap();
        assert_eq!(cache.get(&id1).unwrap(), Some(vec![1, 2, 3]));
        cache.remove_all(&[id1.clone(), id2.clone()]).unwrap();
        assert_eq!(cache.get(&id1).unwrap(), None);
        assert_eq!(cache.get(&id2).unwrap(), None);
    }

    #[test]
    fn data_store_add_item_dedups_by_source_url() {
        let store = InMemoryDataStore::new();
        let m1 = Metadata::new("http://x/y").to_builder().title("first").build();
        let id1 = store.add_item(m1, None).unwrap();
        let m2 = Metadata::new("http://x/y").to_builder().title("second").build();
        let id2 = store.add_item(m2, None).unwrap();
        assert_eq!(id1, id2);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn data_store_pending_children_reach_zero() {
        let store = InMemoryDataStore::new();
        store.add_item(Metadata::new("u"), None).unwrap();
        store.increment_pending_children("u").unwrap();
        store.increment_pending_children("u").unwrap();
        assert!(!store.decrement_pending_children("u").unwrap());
        assert!(store.decrement_pending_children("u").unwrap());
    }

    #[test]
    fn data_store_is_terminal() {
        let store = InMemoryDataStore::new();
        let m = Metadata::new("u")
            .to_builder()
            .processing_state(paise_model::ProcessingState::Stored)
            .build();
        store.add_item(m, None).unwrap();
        assert!(store.is_terminal("u").unwrap());
    }
}
