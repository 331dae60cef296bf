//! Tree merge algorithm shared by default-layering and overlay application.

use serde_json::Value;

/// How array values combine when the same dotted path appears in both trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPolicy {
    /// The earlier tree's list, followed by the later tree's list.
    Concat,
    /// The later tree's list wins outright.
    Replace,
}

/// Merges `incoming` onto `base`.
///
/// - Scalars in `incoming` replace `base`'s (last-wins).
/// - Maps are merged key-by-key, recursively.
/// - Lists follow `list_policy`.
/// - A type mismatch (e.g. a map in `base`, a scalar in `incoming`) always
///   takes `incoming`'s value, since trees have no way to reconcile shape
///   changes across runs other than accepting the newer document.
pub fn merge(base: Value, incoming: Value, list_policy: ListPolicy) -> Value {
    match (base, incoming) {
        (Value::Object(mut base_map), Value::Object(incoming_map)) => {
            for (k, v) in incoming_map {
                let merged = match base_map.remove(&k) {
                    Some(existing) => merge(existing, v, list_policy),
                    None => v,
                };
                base_map.insert(k, merged);
            }
            Value::Object(base_map)
        }
        (Value::Array(mut base_list), Value::Array(incoming_list)) => match list_policy {
            ListPolicy::Concat => {
                base_list.extend(incoming_list);
                Value::Array(base_list)
            }
            ListPolicy::Replace => Value::Array(incoming_list),
        },
        (_, incoming) => incoming,
    }
}
