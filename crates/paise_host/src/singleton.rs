//! The `SingletonSet` the orchestrator constructs in phase 3.

use core::any::Any;
use paise_config::ConfigurationView;
use paise_store::{Cache, DataStore, StateStore};
use paise_tasks::{TaskQueueHandle, TaskRegistry};
use std::sync::Arc;

/// Every core singleton a run constructs, in the order phase 3 builds them.
///
/// `plugin_manager` is carried as a type-erased handle rather than a
/// concrete `Registry` reference: `paise_registry`'s extension-point
/// traits take host facade types (defined here) as call arguments, so
/// `paise_host` cannot depend on `paise_registry` without a cycle. This
/// mirrors the teacher's own `Resources` container, which stores
/// `Box<dyn Any + Send + Sync>` and downcasts at the call site — the
/// orchestrator downcasts this handle back to `Registry` where needed.
#[derive(Clone)]
pub struct SingletonSet {
    state_store: Arc<dyn StateStore>,
    configuration: ConfigurationView,
    cache: Arc<dyn Cache>,
    data_store: Arc<dyn DataStore>,
    task_queue: Arc<dyn TaskQueueHandle>,
    task_registry: Arc<TaskRegistry>,
    plugin_manager: Arc<dyn Any + Send + Sync>,
}

impl SingletonSet {
    /// Assembles a `SingletonSet` from its already-constructed parts.
    /// Called once, by the orchestrator, after phase 3 completes.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state_store: Arc<dyn StateStore>,
        configuration: ConfigurationView,
        cache: Arc<dyn Cache>,
        data_store: Arc<dyn DataStore>,
        task_queue: Arc<dyn TaskQueueHandle>,
        task_registry: Arc<TaskRegistry>,
        plugin_manager: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        Self {
            state_store,
            configuration,
            cache,
            data_store,
            task_queue,
            task_registry,
            plugin_manager,
        }
    }

    #[must_use]
    pub fn state_store(&self) -> &Arc<dyn StateStore> {
        &self.state_store
    }

    #[must_use]
    pub fn configuration(&self) -> &ConfigurationView {
        &self.configuration
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<dyn Cache> {
        &self.cache
    }

    #[must_use]
    pub fn data_store(&self) -> &Arc<dyn DataStore> {
        &self.data_store
    }

    #[must_use]
    pub fn task_queue(&self) -> &Arc<dyn TaskQueueHandle> {
        &self.task_queue
    }

    #[must_use]
    pub fn task_registry(&self) -> &Arc<TaskRegistry> {
        &self.task_registry
    }

    /// Downcasts the opaque plugin-manager handle back to `T` (typically
    /// `paise_registry::Registry`). Returns `None` on type mismatch, which
    /// would indicate an orchestrator bug rather than a plugin error.
    #[must_use]
    pub fn plugin_manager<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.plugin_manager.downcast_ref::<T>()
    }
}
