//! Inline and queued [`TaskQueueHandle`] implementations.

use crate::backoff::{backoff_delay, RetryPolicy};
use crate::cancellation::CancellationToken;
use crate::error::{TaskError, TaskFailure};
use crate::payload::TaskPayload;
use crate::registry::TaskRegistry;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// A queue a host schedules work onto. Implementations are either
/// synchronous ([`InlineTaskQueue`]) or backed by a worker pool
/// ([`QueuedTaskQueue`]).
pub trait TaskQueueHandle: Send + Sync {
    /// Schedules `payload` for execution. In inline mode this runs the
    /// task (including its full retry loop) before returning; in queued
    /// mode it returns once the payload is accepted onto the channel.
    fn enqueue(&self, payload: TaskPayload) -> Result<(), TaskError>;

    /// True for the inline sentinel handle. Hosts use this only for
    /// diagnostics; scheduling semantics are identical either way from the
    /// caller's perspective (both dedup and retries happen regardless).
    fn is_inline(&self) -> bool {
        false
    }

    /// Signals the queue to stop accepting and processing new work. Called
    /// once by the orchestrator during shutdown. The inline queue has no
    /// background workers, so the default is a no-op.
    fn shutdown(&self) {}
}

/// Runs `f(payload)` to completion, retrying transient failures with
/// exponential-jittered backoff up to `policy.max_attempts`.
fn run_with_retry(
    f: &crate::registry::TaskFn,
    payload: TaskPayload,
    policy: &RetryPolicy,
) -> Result<(), TaskFailure> {
    let name = payload.task_name();
    let mut attempt = 0;
    loop {
        match f(payload.clone()) {
            Ok(()) => return Ok(()),
            Err(failure) if !failure.is_transient() => {
                error!(task = %name, error = %failure, "task failed permanently");
                return Err(failure);
            }
            Err(failure) => {
                attempt += 1;
                if attempt >= policy.max_attempts {
                    error!(task = %name, error = %failure, attempt, "task exhausted retries");
                    return Err(failure);
                }
                warn!(task = %name, error = %failure, attempt, "task failed, retrying");
                std::thread::sleep(backoff_delay(attempt, policy));
            }
        }
    }
}

/// Tasks execute synchronously on the caller's thread at enqueue time.
/// Used by the `test` profile and for single-process debugging.
pub struct InlineTaskQueue {
    registry: Arc<TaskRegistry>,
    retry_policy: RetryPolicy,
}

impl InlineTaskQueue {
    #[must_use]
    pub fn new(registry: Arc<TaskRegistry>, retry_policy: RetryPolicy) -> Self {
        Self {
            registry,
            retry_policy,
        }
    }
}

impl TaskQueueHandle for InlineTaskQueue {
    fn enqueue(&self, payload: TaskPayload) -> Result<(), TaskError> {
        let name = payload.task_name();
        let f = self
            .registry
            .get(name)
            .ok_or_else(|| TaskError::UnknownTask(name.to_string()))?;
        run_with_retry(&f, payload, &self.retry_policy).map_err(TaskError::Failed)
    }

    fn is_inline(&self) -> bool {
        true
    }
}

/// A queued payload, paired with a monotonic id for introspection and tests.
#[derive(Debug, Clone)]
struct QueuedItem {
    payload: TaskPayload,
}

/// Backed by a `tokio::sync::mpsc` channel and a fixed-size pool of
/// `tokio::task` workers. Cancellation is cooperative: workers finish their
/// current task, then stop pulling new ones once the [`CancellationToken`]
/// fires.
pub struct QueuedTaskQueue {
    sender: mpsc::UnboundedSender<QueuedItem>,
    enqueued_count: Arc<AtomicU64>,
    cancellation: CancellationToken,
}

impl QueuedTaskQueue {
    /// Spawns `worker_count` workers on the current tokio runtime, each
    /// pulling from the shared channel and running tasks to completion
    /// (including retries) before pulling the next one.
    #[must_use]
    pub fn start(
        registry: Arc<TaskRegistry>,
        worker_count: usize,
        retry_policy: RetryPolicy,
        cancellation: CancellationToken,
    ) -> (Self, Vec<tokio::task::JoinHandle<()>>) {
        let (sender, receiver) = mpsc::unbounded_channel::<QueuedItem>();
        let receiver = Arc::new(Mutex::new(receiver));
        let enqueued_count = Arc::new(AtomicU64::new(0));

        let mut handles = Vec::with_capacity(worker_count.max(1));
        for worker_id in 0..worker_count.max(1) {
            let receiver = Arc::clone(&receiver);
            let registry = Arc::clone(&registry);
            let retry_policy = retry_policy;
            let cancellation = cancellation.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    if cancellation.is_cancelled() {
                        break;
                    }
                    let next = {
                        let mut guard = receiver.lock();
                        guard.try_recv()
                    };
                    let item = match next {
                        Ok(item) => item,
                        Err(mpsc::error::TryRecvError::Empty) => {
                            tokio::select! {
                                () = cancellation.cancelled() => break,
                                () = tokio::time::sleep(std::time::Duration::from_millis(5)) => continue,
                            }
                        }
                        Err(mpsc::error::TryRecvError::Disconnected) => break,
                    };
                    let name = item.payload.task_name();
                    let Some(f) = registry.get(name) else {
                        error!(task = %name, worker_id, "no function registered, dropping task");
                        continue;
                    };
                    if let Err(failure) = run_with_retry(&f, item.payload, &retry_policy) {
                        error!(task = %name, error = %failure, worker_id, "task failed terminally");
                    }
                }
            }));
        }

        (
            Self {
                sender,
                enqueued_count,
                cancellation,
            },
            handles,
        )
    }

    /// Number of payloads accepted onto the channel since construction.
    #[must_use]
    pub fn enqueued_count(&self) -> u64 {
        self.enqueued_count.load(Ordering::SeqCst)
    }

    /// Signals every worker to stop pulling new work after their current task.
    pub fn shutdown(&self) {
        self.cancellation.cancel();
    }
}

impl TaskQueueHandle for QueuedTaskQueue {
    fn enqueue(&self, payload: TaskPayload) -> Result<(), TaskError> {
        if self.cancellation.is_cancelled() {
            return Err(TaskError::QueueClosed);
        }
        self.sender
            .send(QueuedItem { payload })
            .map_err(|_| TaskError::QueueClosed)?;
        self.enqueued_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_inline(&self) -> bool {
        false
    }

    fn shutdown(&self) {
        QueuedTaskQueue::shutdown(self);
    }
}
