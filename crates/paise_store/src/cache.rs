//! `Cache` — partitioned byte-blob storage addressed by opaque ids.

use crate::error::StoreError;
use paise_model::{CacheId, PluginIdentity};

/// Partitioned cache for byte blobs (e.g. fetched response bodies).
///
/// Like [`crate::StateStore`], implementations must be safe for concurrent
/// use across multiple hosts and worker threads.
pub trait Cache: Send + Sync {
    /// Stores `bytes` under `partition`, returning a fresh [`CacheId`].
    fn put(&self, partition: &PluginIdentity, bytes: Vec<u8>) -> Result<CacheId, StoreError>;

    /// Reads the bytes for `id`, if present.
    fn get(&self, id: &CacheId) -> Result<Option<Vec<u8>>, StoreError>;

    /// Removes a single cache entry.
    fn remove(&self, id: &CacheId) -> Result<(), StoreError>;

    /// Removes every id in `ids`. Missing ids are ignored. This is the
    /// operation `cleanup_cache` invokes.
    fn remove_all(&self, ids: &[CacheId]) -> Result<(), StoreError> {
        for id in ids {
            self.remove(id)?;
        }
        Ok(())
    }

    /// Removes every entry belonging to `partition`. Used by `reset_action`.
    fn clear_partition(&self, partition: &PluginIdentity) -> Result<(), StoreError>;
}
