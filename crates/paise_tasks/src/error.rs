//! Task-runtime errors.

/// The outcome a task function reports when it does not succeed.
///
/// The distinction drives retry policy: [`TaskFailure::Transient`] is
/// retried with backoff up to a configured cap; [`TaskFailure::Permanent`]
/// is recorded as failed immediately.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TaskFailure {
    /// Worth retrying — the task handler believes a later attempt may succeed.
    #[error("transient error: {0}")]
    Transient(String),
    /// Not worth retrying — recorded as failed without further attempts.
    #[error("permanent error: {0}")]
    Permanent(String),
}

impl TaskFailure {
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, TaskFailure::Transient(_))
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            TaskFailure::Transient(m) | TaskFailure::Permanent(m) => m,
        }
    }
}

impl From<TaskFailure> for paise_model::PaiseError {
    fn from(value: TaskFailure) -> Self {
        match value {
            TaskFailure::Transient(m) => paise_model::PaiseError::Transient(m),
            TaskFailure::Permanent(m) => paise_model::PaiseError::Permanent(m),
        }
    }
}

/// Errors raised by the task-queue machinery itself (not by task bodies).
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// No function is registered under this task name.
    #[error("no task function registered for '{0}'")]
    UnknownTask(String),

    /// The task body failed; see the inner [`TaskFailure`] for retry policy.
    #[error(transparent)]
    Failed(#[from] TaskFailure),

    /// The queue has been shut down and can no longer accept work.
    #[error("task queue is draining or closed")]
    QueueClosed,

    /// The underlying store raised an error while the runtime consulted it
    /// (e.g. for fingerprint dedup).
    #[error("store error: {0}")]
    Store(#[from] paise_store::StoreError),
}

impl From<TaskError> for paise_model::PaiseError {
    fn from(value: TaskError) -> Self {
        match value {
            TaskError::Failed(f) => f.into(),
            other => paise_model::PaiseError::Assertion(other.to_string()),
        }
    }
}
