//! Plugin identity, the partition key for state and cache.

use core::fmt;

/// Stable string naming the plugin module that registered an extension.
///
/// Derived at host-creation time from the registering plugin; it is never
/// inferred from a call stack (see `DESIGN.md` on why reflection is
/// deliberately avoided). Two identities with the same dotted path are
/// considered the same partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginIdentity(String);

impl PluginIdentity {
    /// Creates a `PluginIdentity` from a dotted module path, e.g. `"p.a"`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the dotted path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The reserved identity used for core-internal partitions (`_system.*`).
    #[must_use]
    pub fn system() -> Self {
        Self::new("_system")
    }

    /// True if this identity is the reserved core partition.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.0 == "_system"
    }
}

impl fmt::Display for PluginIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PluginIdentity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PluginIdentity {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_path() {
        assert_eq!(PluginIdentity::new("p.a"), PluginIdentity::new("p.a"));
        assert_ne!(PluginIdentity::new("p.a"), PluginIdentity::new("p.b"));
    }

    #[test]
    fn system_identity_is_reserved() {
        assert!(PluginIdentity::system().is_system());
        assert!(!PluginIdentity::new("p.a").is_system());
    }
}
