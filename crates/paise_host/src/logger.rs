//! Per-plugin logger returned by `Host::logger()`.

use paise_model::PluginIdentity;

/// A thin wrapper that tags every emitted record with the owning plugin's
/// identity, so a plugin never has to add the tag itself.
///
/// Grounded in the teacher's `TracingPlugin`, which installs a global
/// subscriber once and lets call sites add their own fields; here the
/// identity field is added automatically at the host boundary instead.
#[derive(Debug, Clone)]
pub struct PluginLogger {
    identity: PluginIdentity,
}

impl PluginLogger {
    pub(crate) fn new(identity: PluginIdentity) -> Self {
        Self { identity }
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(plugin = %self.identity, "{message}");
    }

    pub fn info(&self, message: &str) {
        tracing::info!(plugin = %self.identity, "{message}");
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(plugin = %self.identity, "{message}");
    }

    pub fn error(&self, message: &str) {
        tracing::error!(plugin = %self.identity, "{message}");
    }
}
