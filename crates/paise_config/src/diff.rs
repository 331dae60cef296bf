//! Structural diff between two merged configuration trees.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// The structural diff between a run's merged configuration and the tree
/// persisted by the previous run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigurationDiff {
    /// Dotted paths present now but absent before.
    pub added: BTreeSet<String>,
    /// Dotted paths present before but absent now.
    pub removed: BTreeSet<String>,
    /// Dotted paths present in both whose leaf values differ.
    pub modified: BTreeSet<String>,
}

impl ConfigurationDiff {
    /// True iff `path` itself changed, or `path` is an ancestor of a
    /// changed leaf, or `path` is a descendant of one (covers a changed
    /// leaf becoming a map, or vice versa, across runs).
    #[must_use]
    pub fn has_changed(&self, path: &str) -> bool {
        self.added
            .iter()
            .chain(self.removed.iter())
            .chain(self.modified.iter())
            .any(|changed| is_related_path(changed, path))
    }
}

fn is_related_path(changed: &str, path: &str) -> bool {
    changed == path
        || changed.starts_with(&format!("{path}."))
        || path.starts_with(&format!("{changed}."))
}

/// Flattens a JSON tree into dotted-path -> leaf-value pairs. Arrays,
/// scalars, and null are leaves; objects recurse. An empty object or array
/// is itself recorded as a leaf so its presence/absence is diff-visible.
pub fn flatten(tree: &Value, prefix: &str, out: &mut BTreeMap<String, Value>) {
    match tree {
        Value::Object(map) if !map.is_empty() => {
            for (k, v) in map {
                let path = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                flatten(v, &path, out);
            }
        }
        other => {
            out.insert(prefix.to_string(), other.clone());
        }
    }
}

/// Computes the diff between `previous` and `current` merged trees.
#[must_use]
pub fn diff(previous: Option<&Value>, current: &Value) -> ConfigurationDiff {
    let mut before = BTreeMap::new();
    if let Some(p) = previous {
        flatten(p, "", &mut before);
    }
    let mut after = BTreeMap::new();
    flatten(current, "", &mut after);

    let mut result = ConfigurationDiff::default();
    for (path, value) in &after {
        match before.get(path) {
            None => {
                result.added.insert(path.clone());
            }
            Some(old) if old != value => {
                result.modified.insert(path.clone());
            }
            _ => {}
        }
    }
    for path in before.keys() {
        if !after.contains_key(path) {
            result.removed.insert(path.clone());
        }
    }
    result
}
