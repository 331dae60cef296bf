//! The immutable [`Metadata`] record describing one indexable item.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Where a processing item currently sits in the pipeline state machine.
///
/// ```text
/// pending → fetching → extracting → stored → completed
///             │           │            │
///             └─ failed ◄─┴──────────── │
///                                      └─ failed
/// ```
///
/// `stored` and `completed` are both terminal states reached via different
/// routes: `stored` is reached as soon as `store_content` assigns an
/// `ItemId`; `completed` is reached once every recursive extraction the
/// item spawned has itself terminated (see `DataStore::mark_completed`).
/// Leaf items with no recursive extractions are promoted to `completed`
/// immediately after `stored`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    /// Discovered but not yet scheduled for fetching.
    Pending,
    /// A `fetch_content` task is in flight.
    Fetching,
    /// An `extract_content` task is in flight.
    Extracting,
    /// `store_content` has assigned an `ItemId`.
    Stored,
    /// All recursive extractions spawned by this item have terminated.
    Completed,
    /// Processing ended in an unrecoverable error.
    Failed,
}

impl ProcessingState {
    /// True for `stored`, `completed`, and `failed` — states with no further
    /// automatic transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProcessingState::Stored | ProcessingState::Completed | ProcessingState::Failed
        )
    }
}

/// Immutable record describing one indexable item.
///
/// Metadata is never mutated in place. [`Metadata::copy`] and
/// [`Metadata::merge`] both return new values; the core never hands a
/// plugin a reference it can mutate behind the core's back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Canonical identifier for this item. May be synthetic for sub-items
    /// (e.g. a book chapter extracted from a parent document).
    pub source_url: String,
    /// Opaque cache identifier or filesystem path where bytes live.
    pub location: Option<String>,
    /// Human-readable title.
    pub title: Option<String>,
    /// Parent item id, for tree structures (chapters, attachments, ...).
    pub parent_id: Option<String>,
    /// Human-readable description.
    pub description: Option<String>,
    /// Current pipeline state.
    pub processing_state: ProcessingState,
    /// When this item was last (re-)indexed.
    pub indexed_at: Option<String>,
    /// When the underlying source was created.
    pub created_at: Option<String>,
    /// When the underlying source was last modified.
    pub modified_at: Option<String>,
    /// Author or creator, if known.
    pub author: Option<String>,
    /// Ordered, duplicate-free list of tags.
    pub tags: Vec<String>,
    /// MIME type, used for extractor selection.
    pub mime_type: Option<String>,
    /// Free-form string-keyed map for plugin-specific fields.
    pub extra: BTreeMap<String, Value>,
}

impl Metadata {
    /// Creates a new pending `Metadata` with only `source_url` set.
    #[must_use]
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            location: None,
            title: None,
            parent_id: None,
            description: None,
            processing_state: ProcessingState::Pending,
            indexed_at: None,
            created_at: None,
            modified_at: None,
            author: None,
            tags: Vec::new(),
            mime_type: None,
            extra: BTreeMap::new(),
        }
    }

    /// Starts a [`MetadataBuilder`] seeded from this value.
    #[must_use]
    pub fn to_builder(&self) -> MetadataBuilder {
        MetadataBuilder(self.clone())
    }

    /// Returns a new value with the fields in `changes` replacing this
    /// value's fields. `Metadata::copy(Metadata::new(...))` style callers
    /// typically build `changes` via [`MetadataBuilder`].
    #[must_use]
    pub fn copy(&self, changes: MetadataPatch) -> Self {
        let mut next = self.clone();
        changes.apply_replacing(&mut next);
        next
    }

    /// Returns a new value where non-null scalars from `patch` win over
    /// `self`'s fields, `tags` is the concatenation of `self.tags` then
    /// `patch.tags`, and `extra` is deep-merged with `patch`'s keys
    /// winning on leaf conflicts.
    #[must_use]
    pub fn merge(&self, patch: &MetadataPatch) -> Self {
        let mut next = self.clone();
        patch.apply_merging(&mut next);
        next
    }
}

/// A set of field replacements applied to a [`Metadata`] value.
///
/// Every field is optional; unset fields are left untouched by
/// [`Metadata::copy`] and contribute nothing to [`Metadata::merge`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataPatch {
    /// Replacement `source_url`.
    pub source_url: Option<String>,
    /// Replacement `location`.
    pub location: Option<String>,
    /// Replacement `title`.
    pub title: Option<String>,
    /// Replacement `parent_id`.
    pub parent_id: Option<String>,
    /// Replacement `description`.
    pub description: Option<String>,
    /// Replacement `processing_state`.
    pub processing_state: Option<ProcessingState>,
    /// Replacement `indexed_at`.
    pub indexed_at: Option<String>,
    /// Replacement `created_at`.
    pub created_at: Option<String>,
    /// Replacement `modified_at`.
    pub modified_at: Option<String>,
    /// Replacement `author`.
    pub author: Option<String>,
    /// Tags to append (copy) or concatenate (merge).
    pub tags: Vec<String>,
    /// Replacement `mime_type`.
    pub mime_type: Option<String>,
    /// Extra keys to set (copy) or deep-merge (merge).
    pub extra: BTreeMap<String, Value>,
}

impl MetadataPatch {
    fn apply_replacing(self, target: &mut Metadata) {
        if let Some(v) = self.source_url {
            target.source_url = v;
        }
        if self.location.is_some() {
            target.location = self.location;
        }
        if self.title.is_some() {
            target.title = self.title;
        }
        if self.parent_id.is_some() {
            target.parent_id = self.parent_id;
        }
        if self.description.is_some() {
            target.description = self.description;
        }
        if let Some(v) = self.processing_state {
            target.processing_state = v;
        }
        if self.indexed_at.is_some() {
            target.indexed_at = self.indexed_at;
        }
        if self.created_at.is_some() {
            target.created_at = self.created_at;
        }
        if self.modified_at.is_some() {
            target.modified_at = self.modified_at;
        }
        if self.author.is_some() {
            target.author = self.author;
        }
        if !self.tags.is_empty() {
            target.tags = dedup_preserve_order(self.tags);
        }
        if self.mime_type.is_some() {
            target.mime_type = self.mime_type;
        }
        if !self.extra.is_empty() {
            target.extra = self.extra;
        }
    }

    fn apply_merging(&self, target: &mut Metadata) {
        if let Some(v) = &self.source_url {
            target.source_url = v.clone();
        }
        macro_rules! merge_scalar {
            ($field:ident) => {
                if self.$field.is_some() {
                    target.$field = self.$field.clone();
                }
            };
        }
        merge_scalar!(location);
        merge_scalar!(title);
        merge_scalar!(parent_id);
        merge_scalar!(description);
        merge_scalar!(indexed_at);
        merge_scalar!(created_at);
        merge_scalar!(modified_at);
        merge_scalar!(author);
        merge_scalar!(mime_type);
        if let Some(v) = self.processing_state {
            target.processing_state = v;
        }

        let mut tags = core::mem::take(&mut target.tags);
        tags.extend(self.tags.iter().cloned());
        target.tags = dedup_preserve_order(tags);

        for (k, v) in &self.extra {
            deep_merge_json_entry(&mut target.extra, k, v);
        }
    }
}

fn dedup_preserve_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

fn deep_merge_json_entry(map: &mut BTreeMap<String, Value>, key: &str, incoming: &Value) {
    match map.get_mut(key) {
        Some(Value::Object(existing)) => {
            if let Value::Object(incoming_obj) = incoming {
                for (k, v) in incoming_obj {
                    existing.insert(k.clone(), v.clone());
                }
                return;
            }
            map.insert(key.to_string(), incoming.clone());
        }
        _ => {
            map.insert(key.to_string(), incoming.clone());
        }
    }
}

/// Ergonomic builder for constructing [`Metadata`] and [`MetadataPatch`] values.
///
/// ```
/// use paise_model::Metadata;
///
/// let m = Metadata::new("file:///tmp/a.txt")
///     .to_builder()
///     .title("hello")
///     .mime_type("text/plain")
///     .build();
/// assert_eq!(m.title.as_deref(), Some("hello"));
/// ```
#[derive(Debug, Clone)]
pub struct MetadataBuilder(Metadata);

impl MetadataBuilder {
    /// Starts a builder for a brand new item with the given `source_url`.
    #[must_use]
    pub fn new(source_url: impl Into<String>) -> Self {
        Self(Metadata::new(source_url))
    }

    /// Sets `title`.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    /// Sets `description`.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.0.description = Some(description.into());
        self
    }

    /// Sets `mime_type`.
    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.0.mime_type = Some(mime_type.into());
        self
    }

    /// Sets `parent_id`.
    #[must_use]
    pub fn parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.0.parent_id = Some(parent_id.into());
        self
    }

    /// Sets `location`.
    #[must_use]
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.0.location = Some(location.into());
        self
    }

    /// Appends tags, de-duplicating while preserving first-seen order.
    #[must_use]
    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.0.tags.extend(tags.into_iter().map(Into::into));
        self.0.tags = dedup_preserve_order(core::mem::take(&mut self.0.tags));
        self
    }

    /// Sets `processing_state`.
    #[must_use]
    pub fn processing_state(mut self, state: ProcessingState) -> Self {
        self.0.processing_state = state;
        self
    }

    /// Sets a single key in `extra`.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.extra.insert(key.into(), value.into());
        self
    }

    /// Finishes the builder, producing a [`Metadata`] value.
    #[must_use]
    pub fn build(self) -> Metadata {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_with_no_changes_is_identity() {
        let m = Metadata::new("u").to_builder().title("t").build();
        assert_eq!(m.copy(MetadataPatch::default()), m);
    }

    #[test]
    fn copy_replaces_scalars() {
        let m = Metadata::new("u").to_builder().title("old").build();
        let patch = MetadataPatch {
            title: Some("new".into()),
            ..Default::default()
        };
        let m2 = m.copy(patch);
        assert_eq!(m2.title.as_deref(), Some("new"));
    }

    #[test]
    fn merge_concatenates_tags() {
        let m = Metadata::new("u").to_builder().tags(["a", "b"]).build();
        let patch = MetadataPatch {
            tags: vec!["b".into(), "c".into()],
            ..Default::default()
        };
        let merged = m.merge(&patch);
        assert_eq!(merged.tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn merge_deep_merges_extra_maps() {
        let m = Metadata::new("u")
            .to_builder()
            .extra("nested", serde_json::json!({"x": 1}))
            .build();
        let patch = MetadataPatch {
            extra: BTreeMap::from([("nested".to_string(), serde_json::json!({"y": 2}))]),
            ..Default::default()
        };
        let merged = m.merge(&patch);
        assert_eq!(merged.extra["nested"], serde_json::json!({"x": 1, "y": 2}));
    }

    #[test]
    fn merge_scalars_prefer_patch() {
        let m = Metadata::new("u").to_builder().build();
        assert_eq!(m.source_url, "u");
    }

    #[test]
    fn terminal_states() {
        assert!(ProcessingState::Stored.is_terminal());
        assert!(ProcessingState::Completed.is_terminal());
        assert!(ProcessingState::Failed.is_terminal());
        assert!(!ProcessingState::Pending.is_terminal());
        assert!(!ProcessingState::Fetching.is_terminal());
    }
}
