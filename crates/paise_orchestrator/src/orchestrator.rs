//! The five-phase [`StartupOrchestrator`].

use crate::bootstrap_log::BootstrapLog;
use crate::error::OrchestratorError;
use crate::plugin::{Plugin, RegistrationContext};
use crate::profile::Profile;
use core::any::Any;
use paise_config::{ConfigurationSubsystem, ConfigurationView, ProviderDefaults};
use paise_host::{HostFactory, SingletonSet};
use paise_registry::{Registered, Registry};
use paise_tasks::TaskRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Layer};

/// Brings a run's plugins, singletons, and pipeline up in order, and tears
/// them down again in reverse. One orchestrator per run; it is not meant
/// to be reused across `start`/`stop` cycles.
pub struct StartupOrchestrator {
    plugins: Vec<Arc<dyn Plugin>>,
    registry: Arc<Registry>,
    user_config_overlay: Option<PathBuf>,
}

/// What `start` hands back once phase 5 completes: the run's singletons
/// and the registry they were built against, plus the profile that was
/// selected.
pub struct RunHandle {
    pub singletons: Arc<SingletonSet>,
    pub registry: Arc<Registry>,
    pub host_factory: Arc<HostFactory>,
    pub profile: Profile,
}

impl StartupOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            registry: Arc::new(Registry::new()),
            user_config_overlay: None,
        }
    }

    /// Adds a compiled-in plugin. Order among `with_plugin` calls is the
    /// registry's insertion order, and therefore the default selection
    /// tiebreak for every extension-point kind.
    #[must_use]
    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Sets the directory `{provider_id}.yaml` user override files are read
    /// from. Defaults to none, meaning no run has any overrides yet.
    #[must_use]
    pub fn with_user_config_overlay(mut self, dir: PathBuf) -> Self {
        self.user_config_overlay = Some(dir);
        self
    }

    #[must_use]
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Runs discovery for every plugin at the current phase. A
    /// [`paise_registry::RegistryError::RegistrationClosed`] from a single
    /// `register` call is expected and ignored here: a plugin that offers
    /// both provider and consumer kinds attempts both every call, and only
    /// the kinds matching the currently open phase succeed. Any other
    /// error is fatal.
    fn discover(&self, phase: u8, profile: Profile) -> Result<(), OrchestratorError> {
        for plugin in &self.plugins {
            let mut ctx = RegistrationContext::new(&self.registry, plugin.identity(), phase, profile);
            if let Err(source) = plugin.register(&mut ctx) {
                if matches!(source, paise_registry::RegistryError::RegistrationClosed { .. }) {
                    continue;
                }
                return Err(OrchestratorError::RegistrationFailed {
                    plugin_id: plugin.identity().as_str().to_string(),
                    phase,
                    source,
                });
            }
        }
        Ok(())
    }

    /// Runs the five-phase startup sequence and returns the run's
    /// singletons, ready for phase 5's consumers to use.
    pub fn start(&self) -> Result<RunHandle, OrchestratorError> {
        let profile = Profile::from_env();
        info!(%profile, "starting paise run");

        // Phase 1: bootstrap. The buffering layer sits outside any filter
        // so it sees every event regardless of the configured level; the
        // real `fmt` layer is scoped to a `reload`-wrapped filter that
        // starts silenced and is reloaded in once phase 3 knows the
        // profile's configured level.
        let bootstrap_log = BootstrapLog::new();
        let (silenced_filter, reload_handle) = reload::Layer::new(EnvFilter::new("off"));
        let _ = tracing_subscriber::registry()
            .with(bootstrap_log.clone())
            .with(fmt::layer().with_filter(silenced_filter))
            .try_init();

        self.registry.open_provider_phase();
        self.discover(1, profile)?;
        self.registry.close_provider_phase();

        // Phase 2: infrastructure providers are now all known; nothing
        // further to do beyond the registry's own bookkeeping from phase 1.

        // Phase 3: construct singletons, in the order the state store's
        // diff persistence requires. `StateStoreProvider::create` itself
        // takes a `ConfigurationView`, so a second, empty view bootstraps
        // the state store before the real configuration (which needs that
        // same state store to read/persist its diff baseline) is assembled.
        let bootstrap_config = ConfigurationView::new(serde_json::json!({}), Default::default());
        let state_store_provider = first_or_warn(
            self.registry.state_store_providers(),
            "state_store_provider",
            profile,
        )?;
        let state_store = state_store_provider
            .value
            .create(&bootstrap_config)
            .map_err(|source| OrchestratorError::SingletonConstruction {
                kind: "state_store".to_string(),
                provider_id: state_store_provider.identity.as_str().to_string(),
                source,
            })?;

        let config_providers = self.registry.configuration_providers();
        let defaults: Vec<ProviderDefaults<'_>> = config_providers
            .iter()
            .map(|registered| ProviderDefaults {
                provider_id: registered.value.id(),
                yaml: registered.value.default_document(),
            })
            .collect();
        let configuration = ConfigurationSubsystem::assemble(
            &defaults,
            self.user_config_overlay.as_deref(),
            state_store.as_ref(),
        )?;

        let cache_provider = first_or_warn(self.registry.cache_providers(), "cache_provider", profile)?;
        let cache = cache_provider
            .value
            .create(&configuration)
            .map_err(|source| OrchestratorError::SingletonConstruction {
                kind: "cache".to_string(),
                provider_id: cache_provider.identity.as_str().to_string(),
                source,
            })?;

        let data_store_provider =
            first_or_warn(self.registry.data_store_providers(), "data_store_provider", profile)?;
        let data_store = data_store_provider
            .value
            .create(&configuration)
            .map_err(|source| OrchestratorError::SingletonConstruction {
                kind: "data_store".to_string(),
                provider_id: data_store_provider.identity.as_str().to_string(),
                source,
            })?;

        let task_registry = Arc::new(TaskRegistry::new());
        let task_queue_provider =
            first_or_warn(self.registry.task_queue_providers(), "task_queue_provider", profile)?;
        let task_queue = task_queue_provider
            .value
            .create(&configuration, Arc::clone(&task_registry))
            .map_err(|source| OrchestratorError::SingletonConstruction {
                kind: "task_queue".to_string(),
                provider_id: task_queue_provider.identity.as_str().to_string(),
                source,
            })?;

        let plugin_manager: Arc<dyn Any + Send + Sync> = Arc::clone(&self.registry);
        let singletons = Arc::new(SingletonSet::new(
            state_store,
            configuration,
            cache,
            data_store,
            task_queue,
            Arc::clone(&task_registry),
            plugin_manager,
        ));

        // Replace the buffering layer with the configured one and replay.
        let env_filter = EnvFilter::try_new(profile_default_filter(profile)).unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = reload_handle.reload(env_filter);
        bootstrap_log.replay();

        // Phase 4: register the four canonical task functions.
        let host_factory = Arc::new(HostFactory::new(Arc::clone(&singletons)));
        paise_pipeline::register_pipeline_tasks(
            &task_registry,
            Arc::clone(&self.registry),
            Arc::clone(&host_factory),
            Arc::clone(singletons.data_store()),
            Arc::clone(singletons.cache()),
        );

        // Phase 5: load consumers, then start lifecycle actions and sources.
        self.registry.open_consumer_phase();
        self.discover(5, profile)?;

        for registered in self.registry.lifecycle_actions() {
            match host_factory.lifecycle_host(registered.identity.clone()) {
                Ok(host) => {
                    if let Err(err) = registered.value.startup(&host) {
                        error!(plugin = %registered.identity, error = %err, "PluginFailed: lifecycle_action startup");
                    }
                }
                Err(err) => {
                    error!(plugin = %registered.identity, error = %err, "PluginFailed: could not build lifecycle host");
                }
            }
        }

        for registered in self.registry.content_sources() {
            match host_factory.source_host(registered.identity.clone()) {
                Ok(host) => {
                    if let Err(err) = registered.value.start(&host) {
                        error!(plugin = %registered.identity, error = %err, "PluginFailed: content_source start");
                    }
                }
                Err(err) => {
                    error!(plugin = %registered.identity, error = %err, "PluginFailed: could not build source host");
                }
            }
        }

        info!("paise run started");
        Ok(RunHandle {
            singletons,
            registry: self.registry(),
            host_factory,
            profile,
        })
    }

    /// Reverses phase 5 and phase 3, in that order. Best-effort: every step
    /// runs even if an earlier one failed, with failures logged rather than
    /// propagated.
    pub fn stop(&self, run: &RunHandle) {
        for registered in self.registry.content_sources() {
            if let Ok(host) = run.host_factory.source_host(registered.identity.clone()) {
                if let Err(err) = registered.value.stop(&host) {
                    error!(plugin = %registered.identity, error = %err, "content_source stop failed");
                }
            }
        }

        for registered in self.registry.lifecycle_actions() {
            if let Ok(host) = run.host_factory.lifecycle_host(registered.identity.clone()) {
                if let Err(err) = registered.value.shutdown(&host) {
                    error!(plugin = %registered.identity, error = %err, "lifecycle_action shutdown failed");
                }
            }
        }

        run.singletons.task_queue().shutdown();
        self.registry.close_consumer_phase();
        info!("paise run stopped");
    }

    /// Runs every registered `reset_action`. When `hard` is true, also
    /// clears the global, unpartitioned item index afterward: no single
    /// plugin's reset is trusted with that, since the index spans every
    /// plugin's items, not just the resetting plugin's own partition.
    pub fn reset(&self, run: &RunHandle, hard: bool) -> Result<(), OrchestratorError> {
        for registered in self.registry.reset_actions() {
            match run.host_factory.reset_host(registered.identity.clone()) {
                Ok(host) => {
                    if let Err(err) = registered.value.reset(&host, hard) {
                        error!(plugin = %registered.identity, error = %err, "reset_action failed");
                    }
                }
                Err(err) => {
                    error!(plugin = %registered.identity, error = %err, "could not build reset host");
                }
            }
        }
        if hard {
            run.singletons
                .data_store()
                .clear_all()
                .map_err(|source| OrchestratorError::SingletonConstruction {
                    kind: "data_store".to_string(),
                    provider_id: "_hard_reset".to_string(),
                    source: source.into(),
                })?;
        }
        Ok(())
    }
}

impl Default for StartupOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the first-registered provider of a kind, logging a warning for
/// every other one (the documented "first wins" tiebreak), or
/// [`OrchestratorError::MissingProvider`] if none were registered at all.
fn first_or_warn<T: ?Sized>(
    mut providers: Vec<Registered<T>>,
    kind: &str,
    profile: Profile,
) -> Result<Registered<T>, OrchestratorError> {
    if providers.is_empty() {
        return Err(OrchestratorError::MissingProvider {
            kind: kind.to_string(),
            profile: profile.to_string(),
        });
    }
    let winner = providers.remove(0);
    for discarded in &providers {
        warn!(
            kind,
            winner = %winner.identity,
            discarded = %discarded.identity,
            "multiple providers registered; first registered wins"
        );
    }
    Ok(winner)
}

/// The `EnvFilter` directive each profile installs once phase 3 reloads the
/// real logging layer in. Production favors a quieter default; development
/// and test are more verbose for local iteration and test output.
fn profile_default_filter(profile: Profile) -> &'static str {
    match profile {
        Profile::Test => "debug",
        Profile::Development => "info",
        Profile::Production => "warn",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paise_config::ConfigError;
    use paise_host::ResetHost;
    use paise_model::PaiseError;
    use paise_registry::{
        CacheProvider, ConfigurationProvider, DataStoreProvider, ResetAction, StateStoreProvider,
        TaskQueueProvider,
    };
    use paise_store::{Cache, DataStore, InMemoryCache, InMemoryDataStore, InMemoryStateStore, StateStore};
    use paise_tasks::{InlineTaskQueue, RetryPolicy, TaskQueueHandle};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TestInfraPlugin;
    struct StateStoreProviderImpl;
    impl StateStoreProvider for StateStoreProviderImpl {
        fn create(&self, _config: &ConfigurationView) -> Result<Arc<dyn StateStore>, PaiseError> {
            Ok(Arc::new(InMemoryStateStore::default()))
        }
    }
    struct CacheProviderImpl;
    impl CacheProvider for CacheProviderImpl {
        fn create(&self, _config: &ConfigurationView) -> Result<Arc<dyn Cache>, PaiseError> {
            Ok(Arc::new(InMemoryCache::default()))
        }
    }
    struct DataStoreProviderImpl;
    impl DataStoreProvider for DataStoreProviderImpl {
        fn create(&self, _config: &ConfigurationView) -> Result<Arc<dyn DataStore>, PaiseError> {
            Ok(Arc::new(InMemoryDataStore::default()))
        }
    }
    struct TaskQueueProviderImpl;
    impl TaskQueueProvider for TaskQueueProviderImpl {
        fn create(
            &self,
            _config: &ConfigurationView,
            task_registry: Arc<TaskRegistry>,
        ) -> Result<Arc<dyn TaskQueueHandle>, PaiseError> {
            Ok(Arc::new(InlineTaskQueue::new(task_registry, RetryPolicy::default())))
        }
    }
    struct ConfigProviderImpl;
    impl ConfigurationProvider for ConfigProviderImpl {
        fn id(&self) -> &str {
            "p.test_infra"
        }
        fn default_document(&self) -> &str {
            "greeting: hello\n"
        }
    }

    impl Plugin for TestInfraPlugin {
        fn identity(&self) -> paise_model::PluginIdentity {
            paise_model::PluginIdentity::new("p.test_infra")
        }

        fn register(&self, ctx: &mut RegistrationContext<'_>) -> Result<(), paise_registry::RegistryError> {
            ctx.register_configuration_provider(Arc::new(ConfigProviderImpl))?;
            ctx.register_state_store_provider(Arc::new(StateStoreProviderImpl))?;
            ctx.register_cache_provider(Arc::new(CacheProviderImpl))?;
            ctx.register_data_store_provider(Arc::new(DataStoreProviderImpl))?;
            ctx.register_task_queue_provider(Arc::new(TaskQueueProviderImpl))?;
            Ok(())
        }
    }

    struct CountingResetAction {
        hard_calls: Arc<AtomicUsize>,
        soft_calls: Arc<AtomicUsize>,
    }
    impl ResetAction for CountingResetAction {
        fn reset(&self, host: &ResetHost, hard: bool) -> Result<(), PaiseError> {
            host.cache().clear()?;
            if hard {
                self.hard_calls.fetch_add(1, Ordering::SeqCst);
            } else {
                self.soft_calls.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        }
    }
    struct ResettablePlugin {
        hard_calls: Arc<AtomicUsize>,
        soft_calls: Arc<AtomicUsize>,
    }
    impl Plugin for ResettablePlugin {
        fn identity(&self) -> paise_model::PluginIdentity {
            paise_model::PluginIdentity::new("p.resettable")
        }
        fn register(&self, ctx: &mut RegistrationContext<'_>) -> Result<(), paise_registry::RegistryError> {
            ctx.register_reset_action(Arc::new(CountingResetAction {
                hard_calls: Arc::clone(&self.hard_calls),
                soft_calls: Arc::clone(&self.soft_calls),
            }))?;
            Ok(())
        }
    }

    #[test]
    fn missing_provider_fails_startup_at_phase_three() {
        let orchestrator = StartupOrchestrator::new();
        let err = orchestrator.start().unwrap_err();
        assert!(matches!(err, OrchestratorError::MissingProvider { .. }));
    }

    #[test]
    fn full_startup_constructs_singletons_and_configuration() {
        let orchestrator = StartupOrchestrator::new().with_plugin(Arc::new(TestInfraPlugin));
        let run = orchestrator.start().unwrap();
        assert_eq!(
            run.singletons.configuration().get("greeting", serde_json::Value::Null),
            serde_json::json!("hello")
        );
        orchestrator.stop(&run);
    }

    #[test]
    fn reset_runs_every_reset_action_and_hard_reset_clears_the_data_store() {
        let hard_calls = Arc::new(AtomicUsize::new(0));
        let soft_calls = Arc::new(AtomicUsize::new(0));
        let orchestrator = StartupOrchestrator::new()
            .with_plugin(Arc::new(TestInfraPlugin))
            .with_plugin(Arc::new(ResettablePlugin {
                hard_calls: Arc::clone(&hard_calls),
                soft_calls: Arc::clone(&soft_calls),
            }));
        let run = orchestrator.start().unwrap();

        orchestrator.reset(&run, false).unwrap();
        assert_eq!(soft_calls.load(Ordering::SeqCst), 1);
        assert_eq!(hard_calls.load(Ordering::SeqCst), 0);

        orchestrator.reset(&run, true).unwrap();
        assert_eq!(hard_calls.load(Ordering::SeqCst), 1);
        orchestrator.stop(&run);
    }

    #[test]
    fn config_error_converts_into_orchestrator_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: OrchestratorError = ConfigError::UserOverlayIo(io_err).into();
        assert!(matches!(err, OrchestratorError::Configuration(_)));
    }
}
