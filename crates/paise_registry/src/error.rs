//! Registry errors.

/// Errors the registry can raise during plugin registration.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Registration for `kind` was attempted after the phase that accepts
    /// it had already closed.
    #[error("registration closed: {kind} can no longer be registered in phase {phase}")]
    RegistrationClosed {
        /// The extension-point kind being registered, e.g. `content_source`.
        kind: String,
        /// The phase number registration was attempted in.
        phase: u8,
    },

    /// The registered value did not satisfy its contract.
    ///
    /// In Rust the required-operations check collapses to the compiler's
    /// trait bound, so this is raised only for the runtime-only check that
    /// survives translation: attempting to register the exact same
    /// instance twice under one kind.
    #[error("invalid extension for {kind}: {reason}")]
    InvalidExtension {
        /// The extension-point kind.
        kind: String,
        /// Why the extension was rejected.
        reason: String,
    },
}

impl From<RegistryError> for paise_model::PaiseError {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::RegistrationClosed { kind, phase } => {
                paise_model::PaiseError::RegistrationClosed { kind, phase }
            }
            RegistryError::InvalidExtension { kind, reason } => {
                paise_model::PaiseError::InvalidExtension { kind, reason }
            }
        }
    }
}
