//! Indexes a directory tree using only the reference plugins: walks the
//! path given on the command line, fetches each file, and extracts it as
//! plain text or HTML depending on extension.

use paise_config::ConfigurationView;
use paise_host::SingletonSet;
use paise_model::PaiseError;
use paise_orchestrator::{Plugin, RegistrationContext, StartupOrchestrator};
use paise_pipeline::reference::{FileContentFetcher, FileContentSource, HtmlExtractor, PlainTextExtractor};
use paise_registry::{
    CacheProvider, ConfigurationProvider, DataStoreProvider, RegistryError, StateStoreProvider,
    TaskQueueProvider,
};
use paise_store::{Cache, DataStore, InMemoryCache, InMemoryDataStore, InMemoryStateStore, StateStore};
use paise_tasks::{InlineTaskQueue, RetryPolicy, TaskQueueHandle, TaskRegistry};
use std::sync::Arc;

/// Everything this demo needs, bundled behind one plugin: in-memory
/// infrastructure providers plus the reference content-pipeline plugins,
/// with the walked root taken from the command line.
#[derive(Clone)]
struct DirectoryIndexerPlugin {
    root_yaml: String,
}

impl ConfigurationProvider for DirectoryIndexerPlugin {
    fn id(&self) -> &str {
        "p.directory_indexer"
    }

    fn default_document(&self) -> &str {
        &self.root_yaml
    }
}

struct MemoryStateStoreProvider;
impl StateStoreProvider for MemoryStateStoreProvider {
    fn create(&self, _config: &ConfigurationView) -> Result<Arc<dyn StateStore>, PaiseError> {
        Ok(Arc::new(InMemoryStateStore::default()))
    }
}

struct MemoryCacheProvider;
impl CacheProvider for MemoryCacheProvider {
    fn create(&self, _config: &ConfigurationView) -> Result<Arc<dyn Cache>, PaiseError> {
        Ok(Arc::new(InMemoryCache::default()))
    }
}

struct MemoryDataStoreProvider;
impl DataStoreProvider for MemoryDataStoreProvider {
    fn create(&self, _config: &ConfigurationView) -> Result<Arc<dyn DataStore>, PaiseError> {
        Ok(Arc::new(InMemoryDataStore::default()))
    }
}

struct InlineTaskQueueProvider;
impl TaskQueueProvider for InlineTaskQueueProvider {
    fn create(
        &self,
        _config: &ConfigurationView,
        task_registry: Arc<TaskRegistry>,
    ) -> Result<Arc<dyn TaskQueueHandle>, PaiseError> {
        Ok(Arc::new(InlineTaskQueue::new(task_registry, RetryPolicy::default())))
    }
}

impl Plugin for DirectoryIndexerPlugin {
    fn identity(&self) -> paise_model::PluginIdentity {
        paise_model::PluginIdentity::new("p.directory_indexer")
    }

    fn register(&self, ctx: &mut RegistrationContext<'_>) -> Result<(), RegistryError> {
        ctx.register_configuration_provider(Arc::new(self.clone()))?;
        ctx.register_state_store_provider(Arc::new(MemoryStateStoreProvider))?;
        ctx.register_cache_provider(Arc::new(MemoryCacheProvider))?;
        ctx.register_data_store_provider(Arc::new(MemoryDataStoreProvider))?;
        ctx.register_task_queue_provider(Arc::new(InlineTaskQueueProvider))?;

        ctx.register_content_source(Arc::new(FileContentSource))?;
        ctx.register_content_fetcher(Arc::new(FileContentFetcher))?;
        ctx.register_content_extractor(Arc::new(HtmlExtractor))?;
        ctx.register_content_extractor(Arc::new(PlainTextExtractor))?;
        Ok(())
    }
}

fn print_summary(singletons: &SingletonSet) {
    let count = singletons.data_store().count().unwrap_or(0);
    println!("indexed {count} item(s)");
}

fn main() {
    let root = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let root_yaml = format!("root: {root}\n");

    let orchestrator =
        StartupOrchestrator::new().with_plugin(Arc::new(DirectoryIndexerPlugin { root_yaml }));

    match orchestrator.start() {
        Ok(run) => {
            print_summary(&run.singletons);
            orchestrator.stop(&run);
        }
        Err(err) => {
            eprintln!("startup failed: {err}");
            std::process::exit(1);
        }
    }
}
