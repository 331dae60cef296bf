//! Shared error currency.
//!
//! Every crate in the workspace defines its own module-local error enum and
//! converts into [`PaiseError`] at the boundary, the way the teacher's
//! `PersistenceError` wraps `serde_json::Error` via `#[from]`.

/// Errors that can cross a crate boundary anywhere in the runtime.
///
/// Module-local error enums (`RegistryError`, `ConfigError`, `TaskError`,
/// `PipelineError`, `OrchestratorError`) convert into this type so that
/// top-level callers can match on a single error currency without losing
/// the originating detail, which is preserved in the variant's source.
#[derive(Debug, thiserror::Error)]
pub enum PaiseError {
    /// A required extension point had no registered provider.
    #[error("missing singleton: no provider registered for {kind}")]
    MissingSingleton {
        /// The extension-point kind that had no provider, e.g. `state_store_provider`.
        kind: String,
    },

    /// Registration was attempted after its phase had closed.
    #[error("registration closed: {kind} can no longer be registered in phase {phase}")]
    RegistrationClosed {
        /// The extension-point kind being registered.
        kind: String,
        /// The phase number registration was attempted in.
        phase: u8,
    },

    /// A registered extension did not satisfy its contract.
    #[error("invalid extension for {kind}: {reason}")]
    InvalidExtension {
        /// The extension-point kind.
        kind: String,
        /// Why the extension was rejected.
        reason: String,
    },

    /// Configuration YAML failed to parse.
    #[error("configuration parse error in provider '{provider_id}' at {location}: {source}")]
    ConfigurationParse {
        /// The `configuration_provider` id whose document failed to parse.
        provider_id: String,
        /// Human-readable line/column within the offending document.
        location: String,
        /// The underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// No registered fetcher claimed a URL.
    #[error("no fetcher registered for url: {url}")]
    NoFetcher {
        /// The URL that no fetcher could handle.
        url: String,
    },

    /// No registered extractor claimed a piece of content.
    #[error("no extractor registered for url: {url}")]
    NoExtractor {
        /// The source URL that no extractor could handle.
        url: String,
    },

    /// A task failed in a way that should be retried.
    #[error("transient error: {0}")]
    Transient(String),

    /// A task failed in a way that should not be retried.
    #[error("permanent error: {0}")]
    Permanent(String),

    /// A consumer plugin failed during phase 5; the plugin is disabled for the run.
    #[error("plugin failed: {plugin_id}: {reason}")]
    PluginFailed {
        /// The identity of the plugin that failed.
        plugin_id: String,
        /// The failure reason.
        reason: String,
    },

    /// An internal invariant was violated. Always fatal.
    #[error("internal assertion violated: {0}")]
    Assertion(String),
}

impl PaiseError {
    /// True for errors that the task runtime's retry policy should retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, PaiseError::Transient(_))
    }
}
