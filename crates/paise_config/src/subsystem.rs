//! Assembles a run's [`ConfigurationView`] from provider defaults, user
//! overrides, and the previous run's persisted baseline.

use crate::diff::diff;
use crate::error::ConfigError;
use crate::merge::{merge, ListPolicy};
use crate::view::ConfigurationView;
use paise_model::PluginIdentity;
use paise_store::StateStore;
use serde_json::Value;
use std::path::Path;
use tracing::warn;

/// The reserved state key under which the previous run's merged
/// configuration tree is persisted, so this run can diff against it.
const LAST_MERGED_KEY: &str = "configuration/last_merged";

/// A `configuration_provider`'s contribution: an id (used for error
/// reporting and to locate its optional override file) and its default
/// document as YAML source text.
pub struct ProviderDefaults<'a> {
    /// The provider's plugin id, e.g. `"p.my_plugin"`.
    pub provider_id: &'a str,
    /// The default configuration document, as YAML source.
    pub yaml: &'a str,
}

/// Builds [`ConfigurationView`]s for a run.
pub struct ConfigurationSubsystem;

impl ConfigurationSubsystem {
    /// Merges `defaults` (in discovery/registration order, concatenating
    /// lists), applies any `{provider_id}.yaml` override file found under
    /// `user_overlay_dir` (replacing lists at matching paths), diffs the
    /// result against the baseline persisted by the previous run, persists
    /// the new baseline, and returns the assembled view.
    ///
    /// A missing `user_overlay_dir` is not an error: it simply means no run
    /// has any user overrides yet.
    pub fn assemble(
        defaults: &[ProviderDefaults<'_>],
        user_overlay_dir: Option<&Path>,
        state: &dyn StateStore,
    ) -> Result<ConfigurationView, ConfigError> {
        let mut tree = Value::Object(serde_json::Map::new());

        for provider in defaults {
            let parsed = parse_yaml(provider.provider_id, provider.yaml)?;
            tree = merge(tree, parsed, ListPolicy::Concat);
        }

        if let Some(dir) = user_overlay_dir {
            tree = Self::apply_overlays(tree, dir)?;
        }

        let system = PluginIdentity::system();
        let previous = state.get(&system, LAST_MERGED_KEY)?;
        let computed = diff(previous.as_ref(), &tree);

        state.set(&system, LAST_MERGED_KEY, tree.clone())?;

        Ok(ConfigurationView::new(tree, computed))
    }

    fn apply_overlays(mut tree: Value, dir: &Path) -> Result<Value, ConfigError> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(tree),
            Err(err) => return Err(ConfigError::UserOverlayIo(err)),
        };

        let mut overlay_files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(ConfigError::UserOverlayIo)?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
                overlay_files.push(path);
            }
        }
        overlay_files.sort();

        for path in overlay_files {
            let provider_id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("<unknown>")
                .to_string();
            let source = std::fs::read_to_string(&path).map_err(ConfigError::UserOverlayIo)?;
            let parsed = parse_yaml(&provider_id, &source)?;
            tree = merge(tree, parsed, ListPolicy::Replace);
        }

        Ok(tree)
    }
}

fn parse_yaml(provider_id: &str, yaml: &str) -> Result<Value, ConfigError> {
    if yaml.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_yaml::from_str(yaml).map_err(|source| {
        warn!(provider_id, %source, "configuration document failed to parse");
        ConfigError::Parse {
            provider_id: provider_id.to_string(),
            location: source
                .location()
                .map(|l| format!("line {} column {}", l.line(), l.column()))
                .unwrap_or_else(|| "unknown".to_string()),
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use paise_store::InMemoryStateStore;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn first_run_has_no_diff_baseline() {
        let store = InMemoryStateStore::default();
        let defaults = [ProviderDefaults {
            provider_id: "p.a",
            yaml: "x:\n  y: 1\n",
        }];
        let view = ConfigurationSubsystem::assemble(&defaults, None, &store).unwrap();
        assert_eq!(view.get("x.y", Value::Null), json!(1));
        assert!(view.has_changed("x.y"));
    }

    #[test]
    fn second_run_diffs_against_first() {
        let store = InMemoryStateStore::default();
        let defaults = [ProviderDefaults {
            provider_id: "p.a",
            yaml: "x:\n  y: 1\n  z: [2, 3]\n",
        }];
        ConfigurationSubsystem::assemble(&defaults, None, &store).unwrap();

        let defaults2 = [ProviderDefaults {
            provider_id: "p.a",
            yaml: "x:\n  y: 1\n  z: [2, 3, 4]\n  w: new\n",
        }];
        let view2 = ConfigurationSubsystem::assemble(&defaults2, None, &store).unwrap();
        assert!(view2.has_changed("x"));
        assert!(view2.has_changed("x.w"));
        assert!(!view2.has_changed("unrelated"));
    }

    #[test]
    fn defaults_concat_lists_overlay_replaces() {
        let store = InMemoryStateStore::default();
        let defaults = [
            ProviderDefaults {
                provider_id: "p.a",
                yaml: "tags: [base1]\n",
            },
            ProviderDefaults {
                provider_id: "p.b",
                yaml: "tags: [base2]\n",
            },
        ];
        let view = ConfigurationSubsystem::assemble(&defaults, None, &store).unwrap();
        assert_eq!(view.get("tags", Value::Null), json!(["base1", "base2"]));

        let dir = tempdir();
        let mut file = std::fs::File::create(dir.path().join("p.a.yaml")).unwrap();
        write!(file, "tags: [override]\n").unwrap();
        drop(file);

        let view2 =
            ConfigurationSubsystem::assemble(&defaults, Some(dir.path()), &store).unwrap();
        assert_eq!(view2.get("tags", Value::Null), json!(["override"]));
    }

    #[test]
    fn malformed_default_yaml_is_reported() {
        let store = InMemoryStateStore::default();
        let defaults = [ProviderDefaults {
            provider_id: "p.broken",
            yaml: "x: [unclosed\n",
        }];
        let err = ConfigurationSubsystem::assemble(&defaults, None, &store).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn absent_overlay_directory_is_not_an_error() {
        let store = InMemoryStateStore::default();
        let defaults = [ProviderDefaults {
            provider_id: "p.a",
            yaml: "x: 1\n",
        }];
        let missing = Path::new("/nonexistent/paise/overlay/dir");
        let view = ConfigurationSubsystem::assemble(&defaults, Some(missing), &store).unwrap();
        assert_eq!(view.get("x", Value::Null), json!(1));
    }

    #[test]
    fn round_trip_section_fully_qualified_path() {
        let store = InMemoryStateStore::default();
        let defaults = [ProviderDefaults {
            provider_id: "p.a",
            yaml: "a:\n  b:\n    c: 42\n",
        }];
        let view = ConfigurationSubsystem::assemble(&defaults, None, &store).unwrap();
        let section = view.section("a.b");
        let fq = section.fully_qualified_path("c");
        assert_eq!(view.get(&fq, Value::Null), section.get("c", Value::Null));
    }

    fn tempdir() -> tempfile_like::TempDir {
        tempfile_like::TempDir::new()
    }

    /// Tiny self-contained temp-directory helper so tests don't pull in an
    /// extra dev-dependency for a single use site.
    mod tempfile_like {
        use std::path::{Path, PathBuf};

        pub struct TempDir(PathBuf);

        impl TempDir {
            pub fn new() -> Self {
                let mut dir = std::env::temp_dir();
                dir.push(format!("paise_config_test_{}", std::process::id()));
                let _ = std::fs::remove_dir_all(&dir);
                std::fs::create_dir_all(&dir).unwrap();
                Self(dir)
            }

            pub fn path(&self) -> &Path {
                &self.0
            }
        }

        impl Drop for TempDir {
            fn drop(&mut self) {
                let _ = std::fs::remove_dir_all(&self.0);
            }
        }
    }
}
