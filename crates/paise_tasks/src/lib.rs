//! Task-queue runtime: inline and queued execution modes, the task name ->
//! function registry, fingerprint dedup for `fetch_content`, retry with
//! backoff, and cooperative cancellation.

mod backoff;
mod cancellation;
mod dedup;
mod error;
mod payload;
mod queue;
mod registry;

pub use backoff::{backoff_delay, RetryPolicy};
pub use cancellation::CancellationToken;
pub use dedup::{canonicalize_url, should_suppress_fetch};
pub use error::{TaskError, TaskFailure};
pub use payload::{TaskName, TaskPayload};
pub use queue::{InlineTaskQueue, QueuedTaskQueue, TaskQueueHandle};
pub use registry::{TaskFn, TaskRegistry};

/// Common imports for crates building on the task runtime.
pub mod prelude {
    pub use crate::{
        CancellationToken, RetryPolicy, TaskError, TaskFailure, TaskName, TaskPayload,
        TaskQueueHandle, TaskRegistry,
    };
}
