//! Item state-machine bookkeeping shared by every task function.
//!
//! `completed` is reached through a pending-children refcount on
//! [`DataStore`], biased by one "self" unit: `extract_content` bumps the
//! count for its own URL before invoking the extractor, so a leaf item
//! (no recursive children) is released and completed as soon as its own
//! extraction returns. Each recursive `extract_file` call with a
//! `parent_id` bumps the parent's count once more; when a child item
//! terminates it releases that bump, and a parent reaching zero cascades
//! `completed` up through its own `parent_id`, if any.

use paise_model::{Metadata, MetadataPatch, ProcessingState};
use paise_store::{DataStore, StoreError};
use std::collections::BTreeMap;

/// Transitions the item at `url` to `state`, creating it from
/// `metadata_hint` (or a bare `Metadata::new(url)`) if it doesn't exist yet.
pub(crate) fn set_processing_state(
    data_store: &dyn DataStore,
    url: &str,
    metadata_hint: Option<&Metadata>,
    state: ProcessingState,
) -> Result<(), StoreError> {
    let patch = MetadataPatch {
        processing_state: Some(state),
        ..Default::default()
    };
    match data_store.update_metadata(url, &patch) {
        Ok(_) => Ok(()),
        Err(StoreError::NotFound(_)) => {
            let mut base = metadata_hint.cloned().unwrap_or_else(|| Metadata::new(url));
            base.source_url = url.to_string();
            base.processing_state = state;
            data_store.add_item(base, None)?;
            Ok(())
        }
        Err(other) => Err(other),
    }
}

/// Records `url` as `failed` with `reason` in `extra.failure_reason`,
/// creating the item if it doesn't exist yet.
pub(crate) fn fail_item(
    data_store: &dyn DataStore,
    url: &str,
    metadata_hint: Option<&Metadata>,
    reason: &str,
) -> Result<(), StoreError> {
    let mut extra = BTreeMap::new();
    extra.insert("failure_reason".to_string(), serde_json::json!(reason));
    let patch = MetadataPatch {
        processing_state: Some(ProcessingState::Failed),
        extra,
        ..Default::default()
    };
    match data_store.update_metadata(url, &patch) {
        Ok(_) => Ok(()),
        Err(StoreError::NotFound(_)) => {
            let base = metadata_hint.cloned().unwrap_or_else(|| Metadata::new(url));
            let merged = base.merge(&patch);
            data_store.add_item(merged, None)?;
            Ok(())
        }
        Err(other) => Err(other),
    }
}

/// Marks `url` `completed`, unless it has already been recorded as `failed`
/// (a late-arriving child release must not resurrect a failed parent).
fn mark_completed_unless_failed(data_store: &dyn DataStore, url: &str) -> Result<(), StoreError> {
    if let Some(metadata) = data_store.get_by_source_url(url)? {
        if metadata.processing_state != ProcessingState::Failed {
            data_store.mark_completed(url)?;
        }
    }
    Ok(())
}

/// Releases one pending-children unit for `url`. If the count reaches
/// zero, marks `url` completed (unless failed) and cascades the same
/// release to `url`'s own parent, if any.
pub(crate) fn release_and_cascade(data_store: &dyn DataStore, url: &str) -> Result<(), StoreError> {
    if !data_store.decrement_pending_children(url)? {
        return Ok(());
    }
    mark_completed_unless_failed(data_store, url)?;
    let parent = data_store.get_by_source_url(url)?.and_then(|m| m.parent_id);
    if let Some(parent_url) = parent {
        release_and_cascade(data_store, &parent_url)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use paise_store::InMemoryDataStore;

    #[test]
    fn leaf_item_completes_as_soon_as_its_self_unit_releases() {
        let store = InMemoryDataStore::default();
        store.add_item(Metadata::new("u").to_builder().build(), None).unwrap();
        store.increment_pending_children("u").unwrap();
        release_and_cascade(&store, "u").unwrap();
        assert_eq!(
            store.get_by_source_url("u").unwrap().unwrap().processing_state,
            ProcessingState::Completed
        );
    }

    #[test]
    fn parent_waits_for_every_child_before_completing() {
        let store = InMemoryDataStore::default();
        store.add_item(Metadata::new("parent").to_builder().build(), None).unwrap();
        // self unit + one child
        store.increment_pending_children("parent").unwrap();
        store.increment_pending_children("parent").unwrap();

        // self-unit releases first: still waiting on the child.
        release_and_cascade(&store, "parent").unwrap();
        assert_eq!(
            store.get_by_source_url("parent").unwrap().unwrap().processing_state,
            ProcessingState::Pending
        );

        // child terminates, releasing the parent's remaining unit.
        release_and_cascade(&store, "parent").unwrap();
        assert_eq!(
            store.get_by_source_url("parent").unwrap().unwrap().processing_state,
            ProcessingState::Completed
        );
    }

    #[test]
    fn failed_parent_is_not_resurrected_by_a_late_child_release() {
        let store = InMemoryDataStore::default();
        store.add_item(Metadata::new("parent").to_builder().build(), None).unwrap();
        store.increment_pending_children("parent").unwrap();
        fail_item(&store, "parent", None, "no_extractor").unwrap();
        release_and_cascade(&store, "parent").unwrap();
        assert_eq!(
            store.get_by_source_url("parent").unwrap().unwrap().processing_state,
            ProcessingState::Failed
        );
    }
}
