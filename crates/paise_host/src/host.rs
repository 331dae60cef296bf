//! The base `Host` facade and its four specializations.

use crate::logger::PluginLogger;
use crate::partitioned::{CacheHandle, StateHandle};
use crate::singleton::SingletonSet;
use paise_config::ConfigurationView;
use paise_model::{Content, Metadata, PaiseError, PluginIdentity};
use paise_store::DataStore;
use paise_tasks::{should_suppress_fetch, TaskPayload};
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// The facade every host kind carries: logger, configuration, state, and
/// the ability to schedule a fetch.
///
/// Every `Host` is constructed by [`crate::HostFactory`] with a fixed
/// [`PluginIdentity`] that partitions its `state`/`cache` operations; there
/// is no way to reach another plugin's partition through this type.
#[derive(Clone)]
pub struct Host {
    identity: PluginIdentity,
    logger: PluginLogger,
    configuration: ConfigurationView,
    state: StateHandle,
    data_store: Arc<dyn DataStore>,
    task_queue: Arc<dyn paise_tasks::TaskQueueHandle>,
}

impl Host {
    pub(crate) fn new(identity: PluginIdentity, singletons: &SingletonSet) -> Self {
        Self {
            logger: PluginLogger::new(identity.clone()),
            configuration: singletons.configuration().clone(),
            state: StateHandle::new(Arc::clone(singletons.state_store()), identity.clone()),
            data_store: Arc::clone(singletons.data_store()),
            task_queue: Arc::clone(singletons.task_queue()),
            identity,
        }
    }

    #[must_use]
    pub fn identity(&self) -> &PluginIdentity {
        &self.identity
    }

    #[must_use]
    pub fn logger(&self) -> &PluginLogger {
        &self.logger
    }

    #[must_use]
    pub fn configuration(&self) -> &ConfigurationView {
        &self.configuration
    }

    #[must_use]
    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    /// Enqueues a `fetch_content` task for `url`, unless an item already
    /// exists at the canonicalized URL in a terminal `processing_state`
    /// (`stored` or `completed`), in which case the call is a silent no-op.
    pub fn schedule_fetch(&self, url: &str, metadata: Option<Metadata>) -> Result<(), PaiseError> {
        if should_suppress_fetch(self.data_store.as_ref(), url)? {
            return Ok(());
        }
        self.task_queue.enqueue(TaskPayload::FetchContent {
            url: url.to_string(),
            metadata,
        })?;
        Ok(())
    }
}

/// Host passed to `content_source::start`/`stop`. Adds read-only
/// `DataStore` access and `schedule_next_run`.
#[derive(Clone)]
pub struct SourceHost {
    base: Host,
    data_store: Arc<dyn DataStore>,
}

impl Deref for SourceHost {
    type Target = Host;
    fn deref(&self) -> &Host {
        &self.base
    }
}

impl SourceHost {
    pub(crate) fn new(base: Host, data_store: Arc<dyn DataStore>) -> Self {
        Self { base, data_store }
    }

    pub fn get_by_source_url(&self, url: &str) -> Result<Option<Metadata>, PaiseError> {
        Ok(self.data_store.get_by_source_url(url)?)
    }

    pub fn get_by_id(&self, id: &paise_model::ItemId) -> Result<Option<Metadata>, PaiseError> {
        Ok(self.data_store.get_by_id(id)?)
    }

    pub fn is_terminal(&self, url: &str) -> Result<bool, PaiseError> {
        Ok(self.data_store.is_terminal(url)?)
    }

    pub fn count(&self) -> Result<usize, PaiseError> {
        Ok(self.data_store.count()?)
    }

    /// Records a recurrence request the runtime re-enqueues every `interval`.
    /// The reference task queue has no scheduler, so this logs and drops,
    /// matching the spec's documented fallback for an unsupported queue.
    pub fn schedule_next_run(&self, interval: Duration) {
        warn!(
            plugin = %self.base.identity(),
            interval_secs = interval.as_secs(),
            "schedule_next_run is not supported by this task queue; dropping recurrence request"
        );
    }
}

/// Host passed to `content_fetcher::fetch`. Adds `cache` and `extract_file`.
#[derive(Clone)]
pub struct FetcherHost {
    base: Host,
    cache: CacheHandle,
    storage: Arc<dyn DataStore>,
}

impl Deref for FetcherHost {
    type Target = Host;
    fn deref(&self) -> &Host {
        &self.base
    }
}

impl FetcherHost {
    pub(crate) fn new(base: Host, cache: CacheHandle, storage: Arc<dyn DataStore>) -> Self {
        Self { base, cache, storage }
    }

    #[must_use]
    pub fn cache(&self) -> &CacheHandle {
        &self.cache
    }

    /// Enqueues an `extract_content` task for `content`/`metadata`. When
    /// `metadata.parent_id` names a parent item, bumps that parent's
    /// pending-children count so it cannot be marked `completed` until this
    /// extraction also terminates.
    pub fn extract_file(&self, content: Content, metadata: Metadata) -> Result<(), PaiseError> {
        if let Some(parent) = &metadata.parent_id {
            self.storage.increment_pending_children(parent)?;
        }
        self.base
            .task_queue
            .enqueue(TaskPayload::ExtractContent { content, metadata })?;
        Ok(())
    }
}

/// Host passed to `content_extractor::extract`. Adds the full `DataStore`
/// (`storage`), `cache`, and recursive `extract_file`.
#[derive(Clone)]
pub struct ExtractorHost {
    base: Host,
    cache: CacheHandle,
    storage: Arc<dyn DataStore>,
}

impl Deref for ExtractorHost {
    type Target = Host;
    fn deref(&self) -> &Host {
        &self.base
    }
}

impl ExtractorHost {
    pub(crate) fn new(base: Host, cache: CacheHandle, storage: Arc<dyn DataStore>) -> Self {
        Self { base, cache, storage }
    }

    #[must_use]
    pub fn cache(&self) -> &CacheHandle {
        &self.cache
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn DataStore> {
        &self.storage
    }

    /// Enqueues a recursive `extract_content` task. When
    /// `metadata.parent_id` names a parent item, bumps that parent's
    /// pending-children count so it cannot be marked `completed` until this
    /// extraction also terminates.
    pub fn extract_file(&self, content: Content, metadata: Metadata) -> Result<(), PaiseError> {
        if let Some(parent) = &metadata.parent_id {
            self.storage.increment_pending_children(parent)?;
        }
        self.base
            .task_queue
            .enqueue(TaskPayload::ExtractContent { content, metadata })?;
        Ok(())
    }
}

/// Host passed to `lifecycle_action::startup`/`shutdown`. Base surface only.
pub type LifecycleHost = Host;

/// Host passed to `reset_action::reset`. Adds `cache` and the full,
/// unpartitioned `storage` so a reset can clear the plugin's own cache
/// partition and, for a hard reset, the global item index — unlike
/// `SourceHost`, which deliberately exposes only a read-only subset of
/// `DataStore`, a reset action is trusted with the whole surface.
#[derive(Clone)]
pub struct ResetHost {
    base: Host,
    cache: CacheHandle,
    storage: Arc<dyn DataStore>,
}

impl Deref for ResetHost {
    type Target = Host;
    fn deref(&self) -> &Host {
        &self.base
    }
}

impl ResetHost {
    pub(crate) fn new(base: Host, cache: CacheHandle, storage: Arc<dyn DataStore>) -> Self {
        Self { base, cache, storage }
    }

    #[must_use]
    pub fn cache(&self) -> &CacheHandle {
        &self.cache
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn DataStore> {
        &self.storage
    }
}

/// Host used by `data_store`-maintenance hooks. Same shape as [`ResetHost`].
pub type DataStoreHost = ResetHost;
