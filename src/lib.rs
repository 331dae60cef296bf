//! PAISE: a phased plugin runtime for discovering, fetching, extracting,
//! and indexing content.
//!
//! This crate re-exports the workspace's layered crates for convenience.
//! A deployment typically only needs [`prelude`]: the orchestrator, the
//! `Plugin` trait, and the extension-point traits a plugin implements.

/// Shared value types: identities, errors, ids, content, metadata.
pub use paise_model;

/// Partitioned storage traits and in-memory reference implementations.
pub use paise_store;

/// Layered configuration assembly and cross-run diffing.
pub use paise_config;

/// The task queue, retry policy, and task registry.
pub use paise_tasks;

/// Per-plugin host facades and the run's singleton set.
pub use paise_host;

/// The eleven extension-point traits and the phase-gated registry.
pub use paise_registry;

/// The canonical pipeline tasks and, behind `reference-plugins`, the
/// reference file/text/HTML plugins.
pub use paise_pipeline;

/// Profiles, the `Plugin` trait, and the `StartupOrchestrator`.
pub use paise_orchestrator;

/// Common imports for a binary embedding a run.
pub mod prelude {
    pub use paise_orchestrator::prelude::*;
    pub use paise_registry::{
        CacheProvider, CliCommandContributor, ConfigurationProvider, ContentExtractor,
        ContentFetcher, ContentSource, DataStoreProvider, LifecycleAction, ResetAction,
        StateStoreProvider, TaskQueueProvider,
    };
}
