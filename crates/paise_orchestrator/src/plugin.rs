//! The compiled-in plugin trait and phase-scoped registration context.

use crate::profile::Profile;
use paise_model::PluginIdentity;
use paise_registry::{
    CacheProvider, CliCommandContributor, ConfigurationProvider, ContentExtractor, ContentFetcher,
    ContentSource, DataStoreProvider, LifecycleAction, Registry, RegistryError, ResetAction,
    StateStoreProvider, TaskQueueProvider,
};
use std::sync::Arc;

/// One compiled-in extension to the runtime.
///
/// Unlike the teacher's `Plugin::build`/`ready`/`update`/`cleanup`
/// lifecycle with its dependency-ordered, semantically-versioned loading,
/// discovery here has no dependency graph or version compatibility to
/// resolve — nothing in this system asks one plugin to depend on another's
/// presence — so a plugin exposes exactly one entry point, called once per
/// discovery pass.
pub trait Plugin: Send + Sync {
    /// The stable identity recorded against everything this plugin registers.
    fn identity(&self) -> PluginIdentity;

    /// Registers this plugin's extensions into `ctx`.
    ///
    /// Called once during phase 1 (provider phase open, consumer phase
    /// closed) and once during phase 5 (consumer phase open, provider
    /// phase closed). A plugin that registers both provider and consumer
    /// kinds is expected to attempt both every call; the attempt that does
    /// not match the currently open phase fails with
    /// [`RegistryError::RegistrationClosed`], which the orchestrator treats
    /// as the normal, expected outcome of calling registration twice rather
    /// than as a plugin failure.
    ///
    /// A plugin mixing both kinds should not propagate the first
    /// `register_*` call's error with `?` if it wants every kind attempted
    /// on every call: the first `RegistrationClosed` would otherwise abort
    /// the rest of the body before the matching-phase calls run. Matching
    /// one kind per phase (as every plugin in this workspace does) sidesteps
    /// the issue entirely.
    fn register(&self, ctx: &mut RegistrationContext<'_>) -> Result<(), RegistryError>;
}

/// Phase-scoped handle a plugin uses to register its extensions into the
/// shared [`Registry`], one `register_<kind>` method per extension-point
/// kind. Mirrors the teacher's `Plugin::build(&self, server: &mut Server)`
/// shape, with the server's resource-insertion methods replaced by the
/// registry's kind-specific registration methods.
pub struct RegistrationContext<'a> {
    registry: &'a Registry,
    identity: PluginIdentity,
    phase: u8,
    profile: Profile,
}

impl<'a> RegistrationContext<'a> {
    pub(crate) fn new(registry: &'a Registry, identity: PluginIdentity, phase: u8, profile: Profile) -> Self {
        Self { registry, identity, phase, profile }
    }

    /// The active run's profile, so a plugin offering profile-specific
    /// providers can register only the one that applies.
    #[must_use]
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// The identity this context registers extensions under.
    #[must_use]
    pub fn identity(&self) -> &PluginIdentity {
        &self.identity
    }

    pub fn register_configuration_provider(
        &mut self,
        value: Arc<dyn ConfigurationProvider>,
    ) -> Result<(), RegistryError> {
        self.registry
            .register_configuration_provider(self.identity.clone(), value, self.phase)
    }

    pub fn register_task_queue_provider(
        &mut self,
        value: Arc<dyn TaskQueueProvider>,
    ) -> Result<(), RegistryError> {
        self.registry
            .register_task_queue_provider(self.identity.clone(), value, self.phase)
    }

    pub fn register_state_store_provider(
        &mut self,
        value: Arc<dyn StateStoreProvider>,
    ) -> Result<(), RegistryError> {
        self.registry
            .register_state_store_provider(self.identity.clone(), value, self.phase)
    }

    pub fn register_cache_provider(&mut self, value: Arc<dyn CacheProvider>) -> Result<(), RegistryError> {
        self.registry
            .register_cache_provider(self.identity.clone(), value, self.phase)
    }

    pub fn register_data_store_provider(
        &mut self,
        value: Arc<dyn DataStoreProvider>,
    ) -> Result<(), RegistryError> {
        self.registry
            .register_data_store_provider(self.identity.clone(), value, self.phase)
    }

    pub fn register_content_source(&mut self, value: Arc<dyn ContentSource>) -> Result<(), RegistryError> {
        self.registry
            .register_content_source(self.identity.clone(), value, self.phase)
    }

    pub fn register_content_fetcher(&mut self, value: Arc<dyn ContentFetcher>) -> Result<(), RegistryError> {
        self.registry
            .register_content_fetcher(self.identity.clone(), value, self.phase)
    }

    pub fn register_content_extractor(&mut self, value: Arc<dyn ContentExtractor>) -> Result<(), RegistryError> {
        self.registry
            .register_content_extractor(self.identity.clone(), value, self.phase)
    }

    pub fn register_lifecycle_action(&mut self, value: Arc<dyn LifecycleAction>) -> Result<(), RegistryError> {
        self.registry
            .register_lifecycle_action(self.identity.clone(), value, self.phase)
    }

    pub fn register_reset_action(&mut self, value: Arc<dyn ResetAction>) -> Result<(), RegistryError> {
        self.registry
            .register_reset_action(self.identity.clone(), value, self.phase)
    }

    pub fn register_cli_command_contributor(
        &mut self,
        value: Arc<dyn CliCommandContributor>,
    ) -> Result<(), RegistryError> {
        self.registry
            .register_cli_command_contributor(self.identity.clone(), value, self.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paise_config::ConfigurationView;
    use paise_model::PaiseError;
    use paise_store::StateStore;

    struct StubStateStoreProvider;
    impl StateStoreProvider for StubStateStoreProvider {
        fn create(&self, _config: &ConfigurationView) -> Result<Arc<dyn StateStore>, PaiseError> {
            Ok(Arc::new(paise_store::InMemoryStateStore::default()))
        }
    }

    struct StubResetAction;
    impl ResetAction for StubResetAction {
        fn reset(&self, _host: &paise_host::ResetHost, _hard: bool) -> Result<(), PaiseError> {
            Ok(())
        }
    }

    #[test]
    fn provider_registration_succeeds_with_the_provider_phase_open() {
        let registry = Registry::new();
        registry.open_provider_phase();
        let mut ctx = RegistrationContext::new(&registry, PluginIdentity::new("p.a"), 1, Profile::Test);
        ctx.register_state_store_provider(Arc::new(StubStateStoreProvider)).unwrap();
        assert_eq!(registry.state_store_providers().len(), 1);
    }

    #[test]
    fn consumer_registration_fails_closed_during_the_provider_phase() {
        let registry = Registry::new();
        registry.open_provider_phase();
        let mut ctx = RegistrationContext::new(&registry, PluginIdentity::new("p.a"), 1, Profile::Test);
        let err = ctx.register_reset_action(Arc::new(StubResetAction)).unwrap_err();
        assert!(matches!(err, RegistryError::RegistrationClosed { .. }));
    }

    #[test]
    fn context_reports_the_profile_it_was_built_with() {
        let registry = Registry::new();
        let ctx = RegistrationContext::new(&registry, PluginIdentity::new("p.a"), 1, Profile::Production);
        assert_eq!(ctx.profile(), Profile::Production);
    }
}
