//! `FileContentSource` — walks a configured directory once and schedules a
//! fetch for every regular file it finds.

use paise_host::SourceHost;
use paise_model::PaiseError;
use paise_registry::ContentSource;
use std::path::PathBuf;

/// Walks `root` (read from the plugin's own configuration section,
/// `root: <path>`) once at `start`, calling `schedule_fetch("file://...")`
/// for every regular file under it. `stop` is a no-op: the walk is not
/// resumable and there's no background activity to cancel.
pub struct FileContentSource;

impl ContentSource for FileContentSource {
    fn start(&self, host: &SourceHost) -> Result<(), PaiseError> {
        let root = host
            .configuration()
            .get("root", serde_json::json!("."))
            .as_str()
            .unwrap_or(".")
            .to_string();
        walk(&PathBuf::from(&root), host)
    }

    fn stop(&self, _host: &SourceHost) -> Result<(), PaiseError> {
        Ok(())
    }
}

fn walk(dir: &PathBuf, host: &SourceHost) -> Result<(), PaiseError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            host.logger().warn(&format!("cannot read directory {}: {err}", dir.display()));
            return Ok(());
        }
    };
    for entry in entries {
        let entry = entry.map_err(|err| PaiseError::Transient(err.to_string()))?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, host)?;
        } else if path.is_file() {
            let url = format!("file://{}", path.display());
            host.schedule_fetch(&url, None)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use paise_config::ConfigurationView;
    use paise_host::HostFactory;
    use paise_model::PluginIdentity;
    use paise_store::{InMemoryCache, InMemoryDataStore, InMemoryStateStore};
    use paise_tasks::{InlineTaskQueue, RetryPolicy, TaskName, TaskRegistry};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn walks_a_directory_and_schedules_every_file() {
        let dir = std::env::temp_dir().join(format!("paise_file_source_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("a.txt"), "a").unwrap();
        std::fs::write(dir.join("b.txt"), "b").unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = Arc::clone(&seen);
        let task_registry = Arc::new(TaskRegistry::new());
        task_registry.register(TaskName::FetchContent, move |_payload| {
            seen2.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let task_queue: Arc<dyn paise_tasks::TaskQueueHandle> = Arc::new(InlineTaskQueue::new(
            Arc::clone(&task_registry),
            RetryPolicy::default(),
        ));
        let state_store: Arc<dyn paise_store::StateStore> = Arc::new(InMemoryStateStore::default());
        let cache: Arc<dyn paise_store::Cache> = Arc::new(InMemoryCache::default());
        let data_store: Arc<dyn paise_store::DataStore> = Arc::new(InMemoryDataStore::default());
        let config = ConfigurationView::new(
            serde_json::json!({"root": dir.to_string_lossy()}),
            Default::default(),
        );
        let singletons = Arc::new(paise_host::SingletonSet::new(
            state_store,
            config,
            cache,
            data_store,
            task_queue,
            task_registry,
            Arc::new(()),
        ));
        let factory = HostFactory::new(singletons);
        let host = factory.source_host(PluginIdentity::new("p.source")).unwrap();

        FileContentSource.start(&host).unwrap();
        std::fs::remove_dir_all(&dir).ok();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }
}
