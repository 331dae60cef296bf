//! The four canonical task functions: `fetch_content`, `extract_content`,
//! `store_content`, `cleanup_cache`.

use crate::completion::{fail_item, release_and_cascade, set_processing_state};
use crate::error::{store_failure, to_task_failure};
use crate::selection::{select_extractor, select_fetcher};
use paise_host::HostFactory;
use paise_model::{CacheId, Content, Metadata, ProcessingState};
use paise_registry::Registry;
use paise_store::{Cache, DataStore};
use paise_tasks::{TaskFailure, TaskPayload, TaskRegistry, TaskName};
use std::sync::Arc;
use tracing::warn;

fn run_fetch_content(
    url: &str,
    metadata: Option<Metadata>,
    plugin_registry: &Registry,
    host_factory: &HostFactory,
    data_store: &dyn DataStore,
) -> Result<(), TaskFailure> {
    set_processing_state(data_store, url, metadata.as_ref(), ProcessingState::Fetching)
        .map_err(store_failure)?;

    let Some(fetcher) = select_fetcher(plugin_registry, url) else {
        fail_item(data_store, url, metadata.as_ref(), "no_fetcher").map_err(store_failure)?;
        return Ok(());
    };

    let host = host_factory
        .fetcher_host(fetcher.identity.clone())
        .map_err(to_task_failure)?;
    fetcher.value.fetch(&host, url).map_err(to_task_failure)
}

fn run_extract_content(
    content: Content,
    metadata: Metadata,
    plugin_registry: &Registry,
    host_factory: &HostFactory,
    data_store: &dyn DataStore,
) -> Result<(), TaskFailure> {
    let url = metadata.source_url.clone();
    set_processing_state(data_store, &url, Some(&metadata), ProcessingState::Extracting)
        .map_err(store_failure)?;

    let Some(extractor) = select_extractor(plugin_registry, &url, metadata.mime_type.as_deref()) else {
        fail_item(data_store, &url, Some(&metadata), "no_extractor").map_err(store_failure)?;
        return Err(TaskFailure::Permanent(format!(
            "no extractor registered for url: {url}"
        )));
    };

    let host = host_factory
        .extractor_host(extractor.identity.clone())
        .map_err(to_task_failure)?;

    // Bias by one "self" unit before the extractor can recurse — see
    // completion.rs for why this makes leaf items complete immediately.
    data_store.increment_pending_children(&url).map_err(store_failure)?;

    match extractor.value.extract(&host, &content, &metadata) {
        Ok(()) => {
            release_and_cascade(data_store, &url).map_err(store_failure)?;
            Ok(())
        }
        Err(err) => {
            fail_item(data_store, &url, Some(&metadata), "extractor_failed").map_err(store_failure)?;
            release_and_cascade(data_store, &url).map_err(store_failure)?;
            Err(to_task_failure(err))
        }
    }
}

fn run_store_content(content: Content, metadata: Metadata, data_store: &dyn DataStore) -> Result<(), TaskFailure> {
    // The task form of `add_item`. Callers that need the assigned `ItemId`
    // back should call `data_store.add_item` directly instead of going
    // through the task queue, since a task function has no return channel.
    let mut metadata = metadata;
    metadata.processing_state = ProcessingState::Stored;
    data_store
        .add_item(metadata, Some(content))
        .map_err(store_failure)?;
    Ok(())
}

fn run_cleanup_cache(cache_ids: &[CacheId], cache: &dyn Cache) -> Result<(), TaskFailure> {
    cache.remove_all(cache_ids).map_err(store_failure)
}

/// Builds the four task functions and records them in `task_registry`,
/// closing over the run's singletons and the plugin registry. Called once,
/// in orchestrator phase 4, before consumer plugins are loaded.
pub fn register_pipeline_tasks(
    task_registry: &TaskRegistry,
    plugin_registry: Arc<Registry>,
    host_factory: Arc<HostFactory>,
    data_store: Arc<dyn DataStore>,
    cache: Arc<dyn Cache>,
) {
    {
        let plugin_registry = Arc::clone(&plugin_registry);
        let host_factory = Arc::clone(&host_factory);
        let data_store = Arc::clone(&data_store);
        task_registry.register(TaskName::FetchContent, move |payload| match payload {
            TaskPayload::FetchContent { url, metadata } => {
                run_fetch_content(&url, metadata, &plugin_registry, &host_factory, data_store.as_ref())
            }
            other => mismatched_payload(TaskName::FetchContent, &other),
        });
    }

    {
        let plugin_registry = Arc::clone(&plugin_registry);
        let host_factory = Arc::clone(&host_factory);
        let data_store = Arc::clone(&data_store);
        task_registry.register(TaskName::ExtractContent, move |payload| match payload {
            TaskPayload::ExtractContent { content, metadata } => {
                run_extract_content(content, metadata, &plugin_registry, &host_factory, data_store.as_ref())
            }
            other => mismatched_payload(TaskName::ExtractContent, &other),
        });
    }

    {
        let data_store = Arc::clone(&data_store);
        task_registry.register(TaskName::StoreContent, move |payload| match payload {
            TaskPayload::StoreContent { content, metadata } => {
                run_store_content(content, metadata, data_store.as_ref())
            }
            other => mismatched_payload(TaskName::StoreContent, &other),
        });
    }

    {
        let cache = Arc::clone(&cache);
        task_registry.register(TaskName::CleanupCache, move |payload| match payload {
            TaskPayload::CleanupCache { cache_ids } => run_cleanup_cache(&cache_ids, cache.as_ref()),
            other => mismatched_payload(TaskName::CleanupCache, &other),
        });
    }
}

/// Every payload reaches a task function only through `TaskQueueHandle`,
/// which looks the function up by `payload.task_name()` — so this branch
/// is unreachable in practice. Handled without panicking rather than
/// asserted away, since a panic here would take down a worker thread.
fn mismatched_payload(expected: TaskName, payload: &TaskPayload) -> Result<(), TaskFailure> {
    warn!(
        expected = %expected,
        actual = %payload.task_name(),
        "task function invoked with a payload for a different task name"
    );
    Err(TaskFailure::Permanent(format!(
        "payload/task mismatch: expected {expected}, got {}",
        payload.task_name()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use paise_config::ConfigurationView;
    use paise_host::{ExtractorHost, FetcherHost, SingletonSet};
    use paise_model::{PaiseError, PluginIdentity};
    use paise_registry::{ContentExtractor, ContentFetcher};
    use paise_store::{InMemoryCache, InMemoryDataStore, InMemoryStateStore};
    use paise_tasks::{InlineTaskQueue, RetryPolicy, TaskQueueHandle};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FileFetcher;
    impl ContentFetcher for FileFetcher {
        fn can_fetch(&self, url: &str) -> bool {
            url.starts_with("file://")
        }
        fn fetch(&self, host: &FetcherHost, _url: &str) -> Result<(), PaiseError> {
            let metadata = Metadata::new(_url)
                .to_builder()
                .mime_type("text/plain")
                .build();
            host.extract_file(Content::Text("hello".to_string()), metadata)
        }
    }

    struct PlainTextExtractor {
        calls: Arc<AtomicUsize>,
    }
    impl ContentExtractor for PlainTextExtractor {
        fn can_extract(&self, _url: &str, _mime: Option<&str>) -> bool {
            true
        }
        fn preferred_mime_types(&self) -> &[&str] {
            &["text/plain"]
        }
        fn extract(&self, host: &ExtractorHost, content: &Content, metadata: &Metadata) -> Result<(), PaiseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = content.as_text().unwrap_or_default();
            let stored = metadata
                .to_builder()
                .title(text)
                .processing_state(ProcessingState::Stored)
                .build();
            host.storage().add_item(stored, Some(content.clone()))?;
            Ok(())
        }
    }

    /// Wires up a `SingletonSet` whose task queue shares the very
    /// `TaskRegistry` that `register_pipeline_tasks` populates, mirroring
    /// how the orchestrator builds the queue in phase 3 and fills it in
    /// phase 4. Returns a ready-to-enqueue singleton set.
    fn harness() -> (Arc<SingletonSet>, Arc<Registry>) {
        let state_store: Arc<dyn paise_store::StateStore> = Arc::new(InMemoryStateStore::default());
        let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::default());
        let data_store: Arc<dyn DataStore> = Arc::new(InMemoryDataStore::default());

        let registry = Arc::new(Registry::new());
        registry.open_consumer_phase();
        registry
            .register_content_fetcher(PluginIdentity::new("p.file_fetcher"), Arc::new(FileFetcher), 5)
            .unwrap();
        registry
            .register_content_extractor(
                PluginIdentity::new("p.text_extractor"),
                Arc::new(PlainTextExtractor {
                    calls: Arc::new(AtomicUsize::new(0)),
                }),
                5,
            )
            .unwrap();

        let task_registry = Arc::new(TaskRegistry::new());
        let task_queue: Arc<dyn paise_tasks::TaskQueueHandle> = Arc::new(InlineTaskQueue::new(
            Arc::clone(&task_registry),
            RetryPolicy::default(),
        ));

        let plugin_manager: Arc<dyn core::any::Any + Send + Sync> = Arc::clone(&registry) as _;
        let singletons = Arc::new(SingletonSet::new(
            state_store,
            ConfigurationView::new(serde_json::json!({}), Default::default()),
            cache,
            data_store,
            task_queue,
            Arc::clone(&task_registry),
            plugin_manager,
        ));
        let host_factory = Arc::new(HostFactory::new(Arc::clone(&singletons)));
        register_pipeline_tasks(
            &task_registry,
            Arc::clone(&registry),
            host_factory,
            Arc::clone(singletons.data_store()),
            Arc::clone(singletons.cache()),
        );
        (singletons, registry)
    }

    #[test]
    fn happy_path_single_text_file_reaches_completed() {
        let (singletons, _registry) = harness();

        singletons
            .task_queue()
            .enqueue(TaskPayload::FetchContent {
                url: "file:///tmp/a.txt".to_string(),
                metadata: None,
            })
            .unwrap();

        let stored = singletons
            .data_store()
            .get_by_source_url("file:///tmp/a.txt")
            .unwrap()
            .unwrap();
        assert_eq!(stored.title.as_deref(), Some("hello"));
        assert_eq!(stored.processing_state, ProcessingState::Completed);
        assert_eq!(singletons.data_store().count().unwrap(), 1);
    }

    #[test]
    fn missing_fetcher_fails_the_item_without_erroring_the_task() {
        let (singletons, _registry) = harness();

        singletons
            .task_queue()
            .enqueue(TaskPayload::FetchContent {
                url: "unhandled://x".to_string(),
                metadata: None,
            })
            .unwrap();

        let item = singletons.data_store().get_by_source_url("unhandled://x").unwrap().unwrap();
        assert_eq!(item.processing_state, ProcessingState::Failed);
        assert_eq!(item.extra["failure_reason"], serde_json::json!("no_fetcher"));
    }
}
