//! Task names and in-process payloads.

use paise_model::{CacheId, Content, Metadata};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four canonical task kinds the pipeline registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskName {
    FetchContent,
    ExtractContent,
    StoreContent,
    CleanupCache,
}

impl TaskName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TaskName::FetchContent => "fetch_content",
            TaskName::ExtractContent => "extract_content",
            TaskName::StoreContent => "store_content",
            TaskName::CleanupCache => "cleanup_cache",
        }
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-process task payload, carried by typed value rather than serialized
/// bytes since both the inline and the reference queued handle run in the
/// same process. `Serialize`/`Deserialize` are still derived so a future
/// durable queue provider can cross a real process boundary without the
/// core's types changing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPayload {
    /// `{url, metadata?}` — schedules a fetch.
    FetchContent {
        url: String,
        metadata: Option<Metadata>,
    },
    /// `{content, metadata}` — schedules extraction.
    ExtractContent { content: Content, metadata: Metadata },
    /// `{content, metadata}` — the deferred form of `add_item`.
    StoreContent { content: Content, metadata: Metadata },
    /// `{cache_ids}` — releases cached bytes no longer referenced.
    CleanupCache { cache_ids: Vec<CacheId> },
}

impl TaskPayload {
    /// The task name this payload is dispatched under.
    #[must_use]
    pub fn task_name(&self) -> TaskName {
        match self {
            TaskPayload::FetchContent { .. } => TaskName::FetchContent,
            TaskPayload::ExtractContent { .. } => TaskName::ExtractContent,
            TaskPayload::StoreContent { .. } => TaskName::StoreContent,
            TaskPayload::CleanupCache { .. } => TaskName::CleanupCache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_name_round_trips_through_display() {
        assert_eq!(TaskName::FetchContent.to_string(), "fetch_content");
        assert_eq!(TaskName::CleanupCache.to_string(), "cleanup_cache");
    }

    #[test]
    fn payload_reports_its_own_task_name() {
        let payload = TaskPayload::CleanupCache { cache_ids: vec![] };
        assert_eq!(payload.task_name(), TaskName::CleanupCache);
    }
}
