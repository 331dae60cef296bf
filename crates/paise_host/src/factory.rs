//! Builds per-plugin host facades from a [`SingletonSet`].

use crate::host::{DataStoreHost, ExtractorHost, FetcherHost, Host, LifecycleHost, ResetHost, SourceHost};
use crate::partitioned::CacheHandle;
use crate::singleton::SingletonSet;
use paise_model::{PaiseError, PluginIdentity};
use std::sync::Arc;

/// Constructs host facades, each scoped to one plugin's [`PluginIdentity`].
///
/// One `HostFactory` is built per run from the run's [`SingletonSet`] and
/// handed to the orchestrator, which calls the appropriate `*_host` method
/// once per plugin as it loads consumers in phase 5.
pub struct HostFactory {
    singletons: Arc<SingletonSet>,
}

impl HostFactory {
    #[must_use]
    pub fn new(singletons: Arc<SingletonSet>) -> Self {
        Self { singletons }
    }

    fn base(&self, identity: impl Into<PluginIdentity>) -> Result<Host, PaiseError> {
        let identity = identity.into();
        if identity.is_system() {
            return Err(PaiseError::Assertion(
                "the reserved `_system` identity cannot be assigned to a plugin host".to_string(),
            ));
        }
        Ok(Host::new(identity, &self.singletons))
    }

    pub fn source_host(&self, identity: impl Into<PluginIdentity>) -> Result<SourceHost, PaiseError> {
        let base = self.base(identity)?;
        Ok(SourceHost::new(base, Arc::clone(self.singletons.data_store())))
    }

    pub fn fetcher_host(&self, identity: impl Into<PluginIdentity>) -> Result<FetcherHost, PaiseError> {
        let base = self.base(identity)?;
        let cache = CacheHandle::new(Arc::clone(self.singletons.cache()), base.identity().clone());
        let storage = Arc::clone(self.singletons.data_store());
        Ok(FetcherHost::new(base, cache, storage))
    }

    pub fn extractor_host(&self, identity: impl Into<PluginIdentity>) -> Result<ExtractorHost, PaiseError> {
        let base = self.base(identity)?;
        let cache = CacheHandle::new(Arc::clone(self.singletons.cache()), base.identity().clone());
        let storage = Arc::clone(self.singletons.data_store());
        Ok(ExtractorHost::new(base, cache, storage))
    }

    pub fn lifecycle_host(&self, identity: impl Into<PluginIdentity>) -> Result<LifecycleHost, PaiseError> {
        self.base(identity)
    }

    pub fn reset_host(&self, identity: impl Into<PluginIdentity>) -> Result<ResetHost, PaiseError> {
        let base = self.base(identity)?;
        let cache = CacheHandle::new(Arc::clone(self.singletons.cache()), base.identity().clone());
        let storage = Arc::clone(self.singletons.data_store());
        Ok(ResetHost::new(base, cache, storage))
    }

    /// Same construction as [`HostFactory::reset_host`]: a `DataStoreHost`
    /// is a `ResetHost` under another name, used by maintenance hooks that
    /// are not cast as resets.
    pub fn data_store_host(&self, identity: impl Into<PluginIdentity>) -> Result<DataStoreHost, PaiseError> {
        self.reset_host(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::any::Any;
    use paise_config::ConfigurationView;
    use paise_store::{InMemoryCache, InMemoryDataStore, InMemoryStateStore};
    use paise_tasks::{InlineTaskQueue, RetryPolicy, TaskRegistry};

    fn test_singletons() -> Arc<SingletonSet> {
        let state_store: Arc<dyn paise_store::StateStore> = Arc::new(InMemoryStateStore::default());
        let cache: Arc<dyn paise_store::Cache> = Arc::new(InMemoryCache::default());
        let data_store: Arc<dyn paise_store::DataStore> = Arc::new(InMemoryDataStore::default());
        let task_registry = Arc::new(TaskRegistry::new());
        let task_queue: Arc<dyn paise_tasks::TaskQueueHandle> = Arc::new(InlineTaskQueue::new(
            Arc::clone(&task_registry),
            RetryPolicy::default(),
        ));
        let plugin_manager: Arc<dyn Any + Send + Sync> = Arc::new(());
        Arc::new(SingletonSet::new(
            state_store,
            ConfigurationView::new(serde_json::json!({}), Default::default()),
            cache,
            data_store,
            task_queue,
            task_registry,
            plugin_manager,
        ))
    }

    #[test]
    fn rejects_the_reserved_system_identity() {
        let factory = HostFactory::new(test_singletons());
        let err = factory.lifecycle_host("_system").unwrap_err();
        assert!(matches!(err, PaiseError::Assertion(_)));
    }

    #[test]
    fn each_host_kind_is_scoped_to_its_identity() {
        let factory = HostFactory::new(test_singletons());
        let source = factory.source_host("p.source").unwrap();
        let fetcher = factory.fetcher_host("p.fetcher").unwrap();
        assert_eq!(source.identity().as_str(), "p.source");
        assert_eq!(fetcher.identity().as_str(), "p.fetcher");
    }

    #[test]
    fn partitioned_state_does_not_cross_hosts() {
        let factory = HostFactory::new(test_singletons());
        let a = factory.lifecycle_host("p.a").unwrap();
        let b = factory.lifecycle_host("p.b").unwrap();
        a.state().set("seen", serde_json::json!(1)).unwrap();
        b.state().set("seen", serde_json::json!(2)).unwrap();
        assert_eq!(a.state().get("seen", serde_json::Value::Null).unwrap(), serde_json::json!(1));
        assert_eq!(b.state().get("seen", serde_json::Value::Null).unwrap(), serde_json::json!(2));
    }
}
