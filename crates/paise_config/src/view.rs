//! The immutable, published [`ConfigurationView`].

use crate::diff::ConfigurationDiff;
use serde_json::Value;
use std::sync::Arc;

/// Immutable mapping from dotted string key to value, plus the diff
/// against the previous run's published view.
///
/// Constructed once per run by [`crate::ConfigurationSubsystem::assemble`]
/// and shared (cheaply, via `Arc`) with every host.
#[derive(Debug, Clone)]
pub struct ConfigurationView {
    root: Arc<Value>,
    base_path: String,
    diff: Arc<ConfigurationDiff>,
}

impl ConfigurationView {
    /// Wraps an already-merged tree and its diff as a view. Used internally
    /// by [`crate::ConfigurationSubsystem::assemble`]; exposed publicly for
    /// tests and minimal embeddings that construct a view without going
    /// through the subsystem.
    #[must_use]
    pub fn new(root: Value, diff: ConfigurationDiff) -> Self {
        Self {
            root: Arc::new(root),
            base_path: String::new(),
            diff: Arc::new(diff),
        }
    }

    fn full_path(&self, key: &str) -> String {
        if self.base_path.is_empty() {
            key.to_string()
        } else if key.is_empty() {
            self.base_path.clone()
        } else {
            format!("{}.{}", self.base_path, key)
        }
    }

    /// Navigates the dotted path `key` (relative to this view's section, if
    /// any) and returns its value, or `default` if any segment is missing.
    #[must_use]
    pub fn get(&self, key: &str, default: Value) -> Value {
        navigate(&self.root, &self.full_path(key)).cloned().unwrap_or(default)
    }

    /// Like [`ConfigurationView::get`] but returns `None` on a miss instead
    /// of a caller-supplied default.
    #[must_use]
    pub fn get_opt(&self, key: &str) -> Option<Value> {
        navigate(&self.root, &self.full_path(key)).cloned()
    }

    /// Returns a view narrowed to the subtree at `prefix`. The returned
    /// view's `get` calls are relative to `prefix`; its diff remains the
    /// full run diff, so `has_changed` still answers correctly for paths
    /// inside the section.
    #[must_use]
    pub fn section(&self, prefix: &str) -> ConfigurationView {
        ConfigurationView {
            root: Arc::clone(&self.root),
            base_path: self.full_path(prefix),
            diff: Arc::clone(&self.diff),
        }
    }

    /// Reconstructs the absolute dotted path for `key` as seen from the
    /// root view, given this (possibly sectioned) view.
    #[must_use]
    pub fn fully_qualified_path(&self, key: &str) -> String {
        self.full_path(key)
    }

    /// True iff `key` (relative to this section) changed versus the
    /// previous run, or an ancestor/descendant of it changed.
    #[must_use]
    pub fn has_changed(&self, key: &str) -> bool {
        self.diff.has_changed(&self.full_path(key))
    }

    /// The full diff against the previous run's published view.
    #[must_use]
    pub fn diff(&self) -> &ConfigurationDiff {
        &self.diff
    }
}

fn navigate<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    let mut current = root;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use serde_json::json;

    #[test]
    fn get_navigates_dotted_paths() {
        let tree = json!({"a": {"b": {"c": 42}}});
        let view = ConfigurationView::new(tree, ConfigurationDiff::default());
        assert_eq!(view.get("a.b.c", Value::Null), json!(42));
        assert_eq!(view.get("a.b.missing", json!("fallback")), json!("fallback"));
    }

    #[test]
    fn section_scopes_lookups() {
        let tree = json!({"a": {"b": {"c": 42}}});
        let view = ConfigurationView::new(tree, ConfigurationDiff::default());
        let section = view.section("a.b");
        assert_eq!(section.get("c", Value::Null), json!(42));
    }

    #[test]
    fn round_trip_fully_qualified_path() {
        let tree = json!({"a": {"b": {"c": 42}}});
        let view = ConfigurationView::new(tree, ConfigurationDiff::default());
        let section = view.section("a");
        let fq = section.fully_qualified_path("b.c");
        assert_eq!(fq, "a.b.c");
        assert_eq!(view.get(&fq, Value::Null), view.get("a.b.c", Value::Null));
    }

    #[test]
    fn has_changed_respects_section_scope() {
        let run1 = json!({"x": {"y": 1}});
        let run2 = json!({"x": {"y": 2}});
        let d = diff(Some(&run1), &run2);
        let view = ConfigurationView::new(run2, d);
        let section = view.section("x");
        assert!(section.has_changed("y"));
        assert!(!section.has_changed("z"));
    }
}
