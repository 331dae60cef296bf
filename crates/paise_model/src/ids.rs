//! Opaque identifiers, compared only by equality.

use core::fmt;
use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw identifier value produced by the owning subsystem.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

opaque_id!(ItemId, "Identifier for a stored item, produced by the data store.");
opaque_id!(CacheId, "Identifier for a cached byte blob, produced by the cache.");
opaque_id!(TaskId, "Identifier for a queued task, produced by the task queue.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_compare_by_equality_only() {
        assert_eq!(ItemId::new("a"), ItemId::new("a"));
        assert_ne!(ItemId::new("a"), ItemId::new("b"));
    }

    #[test]
    fn ids_roundtrip_through_serde() {
        let id = TaskId::new("t-1");
        let json = serde_json::to_string(&id).unwrap();
        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
