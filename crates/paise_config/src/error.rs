//! Configuration subsystem errors.

/// Errors the configuration subsystem can raise while assembling a run's view.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A `configuration_provider`'s default document, or a user override
    /// file, failed to parse as YAML.
    #[error("configuration parse error in '{provider_id}' at {location}: {source}")]
    Parse {
        /// The provider id (or `{id}.yaml` overlay file) that failed to parse.
        provider_id: String,
        /// Human-readable line/column of the failure.
        location: String,
        /// The underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Reading the user-override directory failed for a reason other than
    /// the directory being absent (which is not an error).
    #[error("failed to read user override directory: {0}")]
    UserOverlayIo(std::io::Error),

    /// The persisted `_system.configuration` baseline could not be read or
    /// written back.
    #[error("configuration persistence error: {0}")]
    Persistence(#[from] paise_store::StoreError),
}

impl From<ConfigError> for paise_model::PaiseError {
    fn from(value: ConfigError) -> Self {
        match value {
            ConfigError::Parse {
                provider_id,
                location,
                source,
            } => paise_model::PaiseError::ConfigurationParse {
                provider_id,
                location,
                source,
            },
            other => paise_model::PaiseError::Assertion(other.to_string()),
        }
    }
}
