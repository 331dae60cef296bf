//! The eleven extension-point traits plugins implement.

use paise_config::ConfigurationView;
use paise_host::{ExtractorHost, FetcherHost, LifecycleHost, ResetHost, SourceHost};
use paise_model::{Content, Metadata, PaiseError};
use paise_store::{Cache, DataStore, StateStore};
use paise_tasks::{TaskQueueHandle, TaskRegistry};
use std::sync::Arc;

/// Supplies one YAML default document, keyed by a unique id.
pub trait ConfigurationProvider: Send + Sync {
    /// The id that names this document; also the `{id}.yaml` override
    /// filename the user-override layer looks for.
    fn id(&self) -> &str;
    /// The default configuration document, as YAML source text.
    fn default_document(&self) -> &str;
}

/// Produces the run's task queue: either a live queue or the inline
/// sentinel.
pub trait TaskQueueProvider: Send + Sync {
    /// Builds the queue handle. `config` is the fully-assembled run
    /// configuration (the queue's own settings typically live under a
    /// `section` named after the provider). `task_registry` is the empty,
    /// shared registry the orchestrator populates in phase 4; the queue
    /// holds on to the same `Arc` so registrations made after this call
    /// still take effect.
    fn create(
        &self,
        config: &ConfigurationView,
        task_registry: Arc<TaskRegistry>,
    ) -> Result<Arc<dyn TaskQueueHandle>, PaiseError>;
}

/// Produces the run's `StateStore`.
pub trait StateStoreProvider: Send + Sync {
    fn create(&self, config: &ConfigurationView) -> Result<Arc<dyn StateStore>, PaiseError>;
}

/// Produces the run's `Cache`.
pub trait CacheProvider: Send + Sync {
    fn create(&self, config: &ConfigurationView) -> Result<Arc<dyn Cache>, PaiseError>;
}

/// Produces the run's `DataStore`.
pub trait DataStoreProvider: Send + Sync {
    fn create(&self, config: &ConfigurationView) -> Result<Arc<dyn DataStore>, PaiseError>;
}

/// A long-lived activity that discovers URLs and schedules fetches for them.
pub trait ContentSource: Send + Sync {
    /// Starts the source's activity. Typically walks a configured location
    /// once, or spawns a background loop, calling `host.schedule_fetch` for
    /// each URL it discovers.
    fn start(&self, host: &SourceHost) -> Result<(), PaiseError>;
    /// Stops the source's activity during shutdown.
    fn stop(&self, host: &SourceHost) -> Result<(), PaiseError>;
}

/// Retrieves bytes for URLs it claims.
pub trait ContentFetcher: Send + Sync {
    /// True if this fetcher can retrieve `url`.
    fn can_fetch(&self, url: &str) -> bool;
    /// Fetches `url` and is expected to call `host.extract_file` itself;
    /// the pipeline does not auto-invoke extraction.
    fn fetch(&self, host: &FetcherHost, url: &str) -> Result<(), PaiseError>;
}

/// Turns fetched content into one or more stored items.
pub trait ContentExtractor: Send + Sync {
    /// True if this extractor can handle `content`/`metadata`.
    fn can_extract(&self, url: &str, mime_type: Option<&str>) -> bool;
    /// MIME types this extractor prefers to handle, consulted before the
    /// fallback `can_extract` pass during selection.
    fn preferred_mime_types(&self) -> &[&str];
    /// Extracts items from `content`, calling `host.storage.add_item` (and,
    /// for recursive structures, `host.extract_file`) to store them.
    fn extract(
        &self,
        host: &ExtractorHost,
        content: &Content,
        metadata: &Metadata,
    ) -> Result<(), PaiseError>;
}

/// Runs at startup/shutdown, independent of any single content item.
pub trait LifecycleAction: Send + Sync {
    fn startup(&self, host: &LifecycleHost) -> Result<(), PaiseError>;
    fn shutdown(&self, host: &LifecycleHost) -> Result<(), PaiseError>;
}

/// Invoked by an administrative entry point to clear transient or
/// persisted state.
pub trait ResetAction: Send + Sync {
    /// `hard = false` clears transient state only; `hard = true`
    /// additionally removes stored items and persisted state.
    fn reset(&self, host: &ResetHost, hard: bool) -> Result<(), PaiseError>;
}

/// Out of core scope beyond its shape: the CLI surface itself is not part
/// of this crate, but the registration shape is preserved so a future CLI
/// layer can enumerate contributed commands.
pub trait CliCommandContributor: Send + Sync {
    /// The command name this contributor adds to the CLI surface.
    fn name(&self) -> &str;
}
