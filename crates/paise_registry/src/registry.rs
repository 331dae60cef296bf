//! Phase-gated storage for every registered extension.

use crate::error::RegistryError;
use crate::traits::{
    CacheProvider, CliCommandContributor, ConfigurationProvider, ContentExtractor, ContentFetcher,
    ContentSource, DataStoreProvider, LifecycleAction, ResetAction, StateStoreProvider,
    TaskQueueProvider,
};
use parking_lot::RwLock;
use paise_model::PluginIdentity;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One registered extension, tagged with the identity of the plugin that
/// registered it. Provider kinds carry an identity too (purely so the
/// profile layer can name which plugin's provider won or lost a duplicate
/// resolution); consumer kinds use it to build the plugin's host.
pub struct Registered<T: ?Sized> {
    /// The plugin that registered this extension.
    pub identity: PluginIdentity,
    /// The registered extension itself.
    pub value: Arc<T>,
}

// Written by hand: `#[derive(Clone)]` would add a spurious `T: Clone` bound,
// which every `dyn Trait` extension point fails to satisfy.
impl<T: ?Sized> Clone for Registered<T> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            value: Arc::clone(&self.value),
        }
    }
}

macro_rules! registered_vec {
    ($name:ident, $trait:path) => {
        #[derive(Clone, Default)]
        pub(crate) struct $name(Vec<Registered<dyn $trait>>);

        impl $name {
            fn push(&mut self, identity: PluginIdentity, value: Arc<dyn $trait>) {
                self.0.push(Registered { identity, value });
            }

            fn contains_instance(&self, value: &Arc<dyn $trait>) -> bool {
                self.0.iter().any(|r| Arc::ptr_eq(&r.value, value))
            }

            pub fn entries(&self) -> &[Registered<dyn $trait>] {
                &self.0
            }
        }
    };
}

registered_vec!(ConfigurationProviders, ConfigurationProvider);
registered_vec!(TaskQueueProviders, TaskQueueProvider);
registered_vec!(StateStoreProviders, StateStoreProvider);
registered_vec!(CacheProviders, CacheProvider);
registered_vec!(DataStoreProviders, DataStoreProvider);
registered_vec!(ContentSources, ContentSource);
registered_vec!(ContentFetchers, ContentFetcher);
registered_vec!(ContentExtractors, ContentExtractor);
registered_vec!(LifecycleActions, LifecycleAction);
registered_vec!(ResetActions, ResetAction);
registered_vec!(CliCommandContributors, CliCommandContributor);

/// The phase-gated collection of every registered extension.
///
/// Provider kinds (`configuration_provider`, `task_queue_provider`,
/// `state_store_provider`, `cache_provider`, `data_store_provider`) accept
/// registrations only while the provider phase is open (orchestrator phase
/// 1). Consumer kinds (`content_source`, `content_fetcher`,
/// `content_extractor`, `lifecycle_action`, `reset_action`,
/// `cli_command_contributor`) accept registrations only while the consumer
/// phase is open (orchestrator phase 5). Each kind preserves insertion
/// order, which is the default tiebreak for selection.
#[derive(Default)]
pub struct Registry {
    provider_phase_open: AtomicBool,
    consumer_phase_open: AtomicBool,

    pub(crate) configuration_providers: RwLock<ConfigurationProviders>,
    pub(crate) task_queue_providers: RwLock<TaskQueueProviders>,
    pub(crate) state_store_providers: RwLock<StateStoreProviders>,
    pub(crate) cache_providers: RwLock<CacheProviders>,
    pub(crate) data_store_providers: RwLock<DataStoreProviders>,

    pub(crate) content_sources: RwLock<ContentSources>,
    pub(crate) content_fetchers: RwLock<ContentFetchers>,
    pub(crate) content_extractors: RwLock<ContentExtractors>,
    pub(crate) lifecycle_actions: RwLock<LifecycleActions>,
    pub(crate) reset_actions: RwLock<ResetActions>,
    pub(crate) cli_command_contributors: RwLock<CliCommandContributors>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the provider phase (orchestrator phase 1).
    pub fn open_provider_phase(&self) {
        self.provider_phase_open.store(true, Ordering::SeqCst);
    }

    /// Closes the provider phase once phase 2 begins.
    pub fn close_provider_phase(&self) {
        self.provider_phase_open.store(false, Ordering::SeqCst);
    }

    /// Opens the consumer phase (orchestrator phase 5).
    pub fn open_consumer_phase(&self) {
        self.consumer_phase_open.store(true, Ordering::SeqCst);
    }

    /// Closes the consumer phase at shutdown.
    pub fn close_consumer_phase(&self) {
        self.consumer_phase_open.store(false, Ordering::SeqCst);
    }

    fn require_provider_phase(&self, kind: &str, phase: u8) -> Result<(), RegistryError> {
        if self.provider_phase_open.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RegistryError::RegistrationClosed {
                kind: kind.to_string(),
                phase,
            })
        }
    }

    fn require_consumer_phase(&self, kind: &str, phase: u8) -> Result<(), RegistryError> {
        if self.consumer_phase_open.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RegistryError::RegistrationClosed {
                kind: kind.to_string(),
                phase,
            })
        }
    }

    pub fn register_configuration_provider(
        &self,
        identity: PluginIdentity,
        value: Arc<dyn ConfigurationProvider>,
        phase: u8,
    ) -> Result<(), RegistryError> {
        self.require_provider_phase("configuration_provider", phase)?;
        let mut providers = self.configuration_providers.write();
        reject_duplicate_instance(providers.contains_instance(&value), "configuration_provider")?;
        providers.push(identity, value);
        Ok(())
    }

    pub fn register_task_queue_provider(
        &self,
        identity: PluginIdentity,
        value: Arc<dyn TaskQueueProvider>,
        phase: u8,
    ) -> Result<(), RegistryError> {
        self.require_provider_phase("task_queue_provider", phase)?;
        let mut providers = self.task_queue_providers.write();
        reject_duplicate_instance(providers.contains_instance(&value), "task_queue_provider")?;
        providers.push(identity, value);
        Ok(())
    }

    pub fn register_state_store_provider(
        &self,
        identity: PluginIdentity,
        value: Arc<dyn StateStoreProvider>,
        phase: u8,
    ) -> Result<(), RegistryError> {
        self.require_provider_phase("state_store_provider", phase)?;
        let mut providers = self.state_store_providers.write();
        reject_duplicate_instance(providers.contains_instance(&value), "state_store_provider")?;
        providers.push(identity, value);
        Ok(())
    }

    pub fn register_cache_provider(
        &self,
        identity: PluginIdentity,
        value: Arc<dyn CacheProvider>,
        phase: u8,
    ) -> Result<(), RegistryError> {
        self.require_provider_phase("cache_provider", phase)?;
        let mut providers = self.cache_providers.write();
        reject_duplicate_instance(providers.contains_instance(&value), "cache_provider")?;
        providers.push(identity, value);
        Ok(())
    }

    pub fn register_data_store_provider(
        &self,
        identity: PluginIdentity,
        value: Arc<dyn DataStoreProvider>,
        phase: u8,
    ) -> Result<(), RegistryError> {
        self.require_provider_phase("data_store_provider", phase)?;
        let mut providers = self.data_store_providers.write();
        reject_duplicate_instance(providers.contains_instance(&value), "data_store_provider")?;
        providers.push(identity, value);
        Ok(())
    }

    pub fn register_content_source(
        &self,
        identity: PluginIdentity,
        value: Arc<dyn ContentSource>,
        phase: u8,
    ) -> Result<(), RegistryError> {
        self.require_consumer_phase("content_source", phase)?;
        let mut sources = self.content_sources.write();
        reject_duplicate_instance(sources.contains_instance(&value), "content_source")?;
        sources.push(identity, value);
        Ok(())
    }

    pub fn register_content_fetcher(
        &self,
        identity: PluginIdentity,
        value: Arc<dyn ContentFetcher>,
        phase: u8,
    ) -> Result<(), RegistryError> {
        self.require_consumer_phase("content_fetcher", phase)?;
        let mut fetchers = self.content_fetchers.write();
        reject_duplicate_instance(fetchers.contains_instance(&value), "content_fetcher")?;
        fetchers.push(identity, value);
        Ok(())
    }

    pub fn register_content_extractor(
        &self,
        identity: PluginIdentity,
        value: Arc<dyn ContentExtractor>,
        phase: u8,
    ) -> Result<(), RegistryError> {
        self.require_consumer_phase("content_extractor", phase)?;
        let mut extractors = self.content_extractors.write();
        reject_duplicate_instance(extractors.contains_instance(&value), "content_extractor")?;
        extractors.push(identity, value);
        Ok(())
    }

    pub fn register_lifecycle_action(
        &self,
        identity: PluginIdentity,
        value: Arc<dyn LifecycleAction>,
        phase: u8,
    ) -> Result<(), RegistryError> {
        self.require_consumer_phase("lifecycle_action", phase)?;
        let mut actions = self.lifecycle_actions.write();
        reject_duplicate_instance(actions.contains_instance(&value), "lifecycle_action")?;
        actions.push(identity, value);
        Ok(())
    }

    pub fn register_reset_action(
        &self,
        identity: PluginIdentity,
        value: Arc<dyn ResetAction>,
        phase: u8,
    ) -> Result<(), RegistryError> {
        self.require_consumer_phase("reset_action", phase)?;
        let mut actions = self.reset_actions.write();
        reject_duplicate_instance(actions.contains_instance(&value), "reset_action")?;
        actions.push(identity, value);
        Ok(())
    }

    pub fn register_cli_command_contributor(
        &self,
        identity: PluginIdentity,
        value: Arc<dyn CliCommandContributor>,
        phase: u8,
    ) -> Result<(), RegistryError> {
        self.require_consumer_phase("cli_command_contributor", phase)?;
        let mut contributors = self.cli_command_contributors.write();
        reject_duplicate_instance(
            contributors.contains_instance(&value),
            "cli_command_contributor",
        )?;
        contributors.push(identity, value);
        Ok(())
    }

    #[must_use]
    pub fn configuration_providers(&self) -> Vec<Registered<dyn ConfigurationProvider>> {
        self.configuration_providers.read().entries().to_vec()
    }

    #[must_use]
    pub fn task_queue_providers(&self) -> Vec<Registered<dyn TaskQueueProvider>> {
        self.task_queue_providers.read().entries().to_vec()
    }

    #[must_use]
    pub fn state_store_providers(&self) -> Vec<Registered<dyn StateStoreProvider>> {
        self.state_store_providers.read().entries().to_vec()
    }

    #[must_use]
    pub fn cache_providers(&self) -> Vec<Registered<dyn CacheProvider>> {
        self.cache_providers.read().entries().to_vec()
    }

    #[must_use]
    pub fn data_store_providers(&self) -> Vec<Registered<dyn DataStoreProvider>> {
        self.data_store_providers.read().entries().to_vec()
    }

    #[must_use]
    pub fn content_sources(&self) -> Vec<Registered<dyn ContentSource>> {
        self.content_sources.read().entries().to_vec()
    }

    #[must_use]
    pub fn content_fetchers(&self) -> Vec<Registered<dyn ContentFetcher>> {
        self.content_fetchers.read().entries().to_vec()
    }

    #[must_use]
    pub fn content_extractors(&self) -> Vec<Registered<dyn ContentExtractor>> {
        self.content_extractors.read().entries().to_vec()
    }

    #[must_use]
    pub fn lifecycle_actions(&self) -> Vec<Registered<dyn LifecycleAction>> {
        self.lifecycle_actions.read().entries().to_vec()
    }

    #[must_use]
    pub fn reset_actions(&self) -> Vec<Registered<dyn ResetAction>> {
        self.reset_actions.read().entries().to_vec()
    }

    #[must_use]
    pub fn cli_command_contributors(&self) -> Vec<Registered<dyn CliCommandContributor>> {
        self.cli_command_contributors.read().entries().to_vec()
    }
}

fn reject_duplicate_instance(is_duplicate: bool, kind: &str) -> Result<(), RegistryError> {
    if is_duplicate {
        Err(RegistryError::InvalidExtension {
            kind: kind.to_string(),
            reason: "this exact instance is already registered".to_string(),
        })
    } else {
        Ok(())
    }
}
