//! `FileContentFetcher` — claims `file://` URLs and reads them from disk.

use paise_host::FetcherHost;
use paise_model::{Metadata, PaiseError};
use paise_registry::ContentFetcher;

/// Reads the local file named by a `file://` URL and hands the bytes to
/// extraction via `host.extract_file`. I/O errors are treated as
/// permanent: a missing or unreadable path will not start existing on a
/// later retry within the same run.
pub struct FileContentFetcher;

impl ContentFetcher for FileContentFetcher {
    fn can_fetch(&self, url: &str) -> bool {
        url.starts_with("file://")
    }

    fn fetch(&self, host: &FetcherHost, url: &str) -> Result<(), PaiseError> {
        let path = url.trim_start_matches("file://");
        let bytes = std::fs::read(path).map_err(|err| PaiseError::Permanent(err.to_string()))?;
        let metadata = Metadata::new(url).to_builder().build();
        host.extract_file(bytes.into(), metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paise_config::ConfigurationView;
    use paise_host::{HostFactory, SingletonSet};
    use paise_model::{Content, PluginIdentity};
    use paise_store::{InMemoryCache, InMemoryDataStore, InMemoryStateStore};
    use paise_tasks::{InlineTaskQueue, RetryPolicy, TaskName, TaskPayload, TaskRegistry};
    use std::sync::{Arc, Mutex};

    #[test]
    fn reads_file_contents_and_enqueues_extraction() {
        let path = std::env::temp_dir().join(format!("paise_file_fetcher_test_{}", std::process::id()));
        std::fs::write(&path, "hello").unwrap();
        let url = format!("file://{}", path.display());

        let seen: Arc<Mutex<Option<Content>>> = Arc::new(Mutex::new(None));
        let seen2 = Arc::clone(&seen);
        let task_registry = Arc::new(TaskRegistry::new());
        task_registry.register(TaskName::ExtractContent, move |payload| {
            if let TaskPayload::ExtractContent { content, .. } = payload {
                *seen2.lock().unwrap() = Some(content);
            }
            Ok(())
        });

        let task_queue: Arc<dyn paise_tasks::TaskQueueHandle> = Arc::new(InlineTaskQueue::new(
            Arc::clone(&task_registry),
            RetryPolicy::default(),
        ));
        let state_store: Arc<dyn paise_store::StateStore> = Arc::new(InMemoryStateStore::default());
        let cache: Arc<dyn paise_store::Cache> = Arc::new(InMemoryCache::default());
        let data_store: Arc<dyn paise_store::DataStore> = Arc::new(InMemoryDataStore::default());
        let singletons = Arc::new(SingletonSet::new(
            state_store,
            ConfigurationView::new(serde_json::json!({}), Default::default()),
            cache,
            data_store,
            task_queue,
            task_registry,
            Arc::new(()),
        ));
        let factory = HostFactory::new(singletons);
        let host = factory.fetcher_host(PluginIdentity::new("p.fetcher")).unwrap();

        FileContentFetcher.fetch(&host, &url).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(seen.lock().unwrap().as_ref().unwrap().as_text(), Some("hello"));
    }
}
