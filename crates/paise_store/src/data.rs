//! `DataStore` — the durable index of stored items.

use crate::error::StoreError;
use paise_model::{CacheId, Content, ItemId, Metadata, MetadataPatch};

/// The durable store of indexed items.
///
/// `add_item` enforces invariant (2) from the data model: at most one
/// stored item shares a `source_url`. Calling `add_item` twice for the
/// same `source_url` updates the existing item (merging metadata) rather
/// than creating a duplicate.
pub trait DataStore: Send + Sync {
    /// Inserts or updates the item identified by `metadata.source_url`,
    /// optionally storing its `content`. Returns the item's [`ItemId`].
    fn add_item(
        &self,
        metadata: Metadata,
        content: Option<Content>,
    ) -> Result<ItemId, StoreError>;

    /// Looks up an item's current metadata by its `source_url`.
    fn get_by_source_url(&self, url: &str) -> Result<Option<Metadata>, StoreError>;

    /// Looks up an item's current metadata by its [`ItemId`].
    fn get_by_id(&self, id: &ItemId) -> Result<Option<Metadata>, StoreError>;

    /// Applies `patch` to the item at `url` via [`Metadata::merge`] and
    /// persists the result, returning the updated metadata.
    fn update_metadata(&self, url: &str, patch: &MetadataPatch) -> Result<Metadata, StoreError>;

    /// True if an item exists at `url` and its `processing_state` is
    /// `stored` or `completed` — the condition `fetch_content` scheduling
    /// checks to suppress duplicate work.
    fn is_terminal(&self, url: &str) -> Result<bool, StoreError>;

    /// Records that one more recursive extraction was spawned from `url`.
    fn increment_pending_children(&self, url: &str) -> Result<(), StoreError>;

    /// Records that a recursive extraction spawned from `url` has
    /// terminated. Returns `true` if the pending-children count reached
    /// zero, meaning the caller should call [`DataStore::mark_completed`].
    fn decrement_pending_children(&self, url: &str) -> Result<bool, StoreError>;

    /// Transitions the item at `url` to `completed`.
    fn mark_completed(&self, url: &str) -> Result<(), StoreError>;

    /// Removes the item at `url`, returning the [`CacheId`]s (if any) that
    /// referenced its cached bytes, so the caller can enqueue `cleanup_cache`.
    fn remove_item(&self, url: &str) -> Result<Vec<CacheId>, StoreError>;

    /// Removes every stored item. Used by a hard [`crate::StateStore`] reset.
    fn clear_all(&self) -> Result<(), StoreError>;

    /// Number of items currently stored.
    fn count(&self) -> Result<usize, StoreError>;
}
