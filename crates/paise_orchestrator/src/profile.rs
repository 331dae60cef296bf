//! Run profile selection.

use std::env;

/// Selects which compiled-in providers a run should prefer when more than
/// one plugin offers an infrastructure extension point of the same kind.
///
/// A plugin that ships profile-specific providers (e.g. an in-memory store
/// for `test`/`development` and a durable one for `production`) is expected
/// to consult [`RegistrationContext::profile`](crate::RegistrationContext::profile)
/// during registration and register only the variant appropriate for the
/// active profile. The registry's own insertion-order, first-registered-wins
/// tiebreak (see `paise_registry::Registry`) is the fallback for plugins
/// that register unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// In-memory stores and the inline task queue. Used by the test suite.
    Test,
    /// In-memory-backed stores by default, pretty log output. The default
    /// when `PAISE2_PROFILE` is unset.
    #[default]
    Development,
    /// Durable stores and the queued task runtime, JSON log output.
    Production,
}

impl Profile {
    /// The environment variable this profile is read from.
    pub const ENV_VAR: &'static str = "PAISE2_PROFILE";

    /// Reads [`Profile::ENV_VAR`], defaulting to [`Profile::Development`]
    /// when the variable is unset or does not name a known profile.
    #[must_use]
    pub fn from_env() -> Self {
        match env::var(Self::ENV_VAR).ok().as_deref() {
            Some("test") => Profile::Test,
            Some("production") => Profile::Production,
            Some("development") | None => Profile::Development,
            Some(other) => {
                tracing::warn!(
                    value = other,
                    "unrecognized {} value, defaulting to development",
                    Self::ENV_VAR
                );
                Profile::Development
            }
        }
    }

    /// The profile's name, as it would appear in `PAISE2_PROFILE`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Test => "test",
            Profile::Development => "development",
            Profile::Production => "production",
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_development() {
        assert_eq!(Profile::default(), Profile::Development);
    }

    #[test]
    fn as_str_round_trips_through_from_env_values() {
        assert_eq!(Profile::Test.as_str(), "test");
        assert_eq!(Profile::Development.as_str(), "development");
        assert_eq!(Profile::Production.as_str(), "production");
    }
}
