//! The name-to-function task registry built in orchestrator phase 4.

use crate::error::TaskFailure;
use crate::payload::{TaskName, TaskPayload};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A task body: a closure over the constructed `SingletonSet` (from the
/// orchestrator's point of view; this crate only sees the function type).
pub type TaskFn = Arc<dyn Fn(TaskPayload) -> Result<(), TaskFailure> + Send + Sync>;

/// Maps task name to task body.
///
/// Built empty in orchestrator phase 3 (alongside the task queue handle,
/// which holds an `Arc` to this same registry) and populated in phase 4
/// once the host factory and data/cache stores it closes over exist. The
/// interior `RwLock` is what makes that ordering possible: the queue can be
/// constructed before a single task function exists.
#[derive(Default)]
pub struct TaskRegistry {
    functions: RwLock<HashMap<TaskName, TaskFn>>,
}

impl TaskRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the function for `name`, replacing any prior registration.
    pub fn register(
        &self,
        name: TaskName,
        f: impl Fn(TaskPayload) -> Result<(), TaskFailure> + Send + Sync + 'static,
    ) {
        self.functions.write().insert(name, Arc::new(f));
    }

    /// Looks up the function registered for `name`.
    #[must_use]
    pub fn get(&self, name: TaskName) -> Option<TaskFn> {
        self.functions.read().get(&name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn registered_function_is_retrievable_and_invokable() {
        let registry = TaskRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls2 = Arc::clone(&calls);
        registry.register(TaskName::CleanupCache, move |_payload| {
            calls2.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let f = registry.get(TaskName::CleanupCache).expect("registered");
        f(TaskPayload::CleanupCache { cache_ids: vec![] }).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unregistered_task_name_returns_none() {
        let registry = TaskRegistry::new();
        assert!(registry.get(TaskName::FetchContent).is_none());
    }
}
