//! Startup orchestrator errors.

use paise_model::PaiseError;

/// Errors the [`crate::StartupOrchestrator`] can raise while bringing a run
/// up. Phase 1-3 failures are fatal to the whole run; phase 5 per-plugin
/// failures are isolated and reported through logging instead (see
/// `crate::orchestrator`).
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// No provider was registered for a required infrastructure kind.
    #[error("no {kind} registered; at least one must be compiled in for the '{profile}' profile")]
    MissingProvider {
        /// The extension-point kind with no registration, e.g. `state_store_provider`.
        kind: String,
        /// The active profile's name, included since provider availability is profile-dependent.
        profile: String,
    },

    /// A provider's `create` call failed.
    #[error("failed to construct {kind} from provider '{provider_id}': {source}")]
    SingletonConstruction {
        /// The singleton kind being constructed, e.g. `cache`.
        kind: String,
        /// The identity of the plugin whose provider failed.
        provider_id: String,
        /// The underlying error.
        #[source]
        source: PaiseError,
    },

    /// Assembling the run's [`paise_config::ConfigurationView`] failed.
    #[error("configuration assembly failed: {0}")]
    Configuration(#[from] paise_config::ConfigError),

    /// A plugin's registration call failed outside the normal
    /// cross-phase `RegistrationClosed` case (fatal only during phases 1-3;
    /// phase 5 registration failures are isolated instead of propagated
    /// through this variant).
    #[error("plugin '{plugin_id}' registration failed in phase {phase}: {source}")]
    RegistrationFailed {
        /// The identity of the plugin whose registration call failed.
        plugin_id: String,
        /// The phase the failure occurred in.
        phase: u8,
        /// The underlying registry error.
        #[source]
        source: paise_registry::RegistryError,
    },
}

impl From<OrchestratorError> for PaiseError {
    fn from(value: OrchestratorError) -> Self {
        match value {
            OrchestratorError::SingletonConstruction { source, .. } => source,
            OrchestratorError::Configuration(source) => source.into(),
            OrchestratorError::RegistrationFailed { source, .. } => source.into(),
            OrchestratorError::MissingProvider { kind, .. } => PaiseError::MissingSingleton { kind },
        }
    }
}
