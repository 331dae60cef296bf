//! Typed extension-point traits and the phase-gated [`Registry`] plugins
//! register themselves into.

mod error;
mod registry;
mod traits;

pub use error::RegistryError;
pub use registry::{Registered, Registry};
pub use traits::{
    CacheProvider, CliCommandContributor, ConfigurationProvider, ContentExtractor, ContentFetcher,
    ContentSource, DataStoreProvider, LifecycleAction, ResetAction, StateStoreProvider,
    TaskQueueProvider,
};

/// Common imports for crates consuming the registry layer.
pub mod prelude {
    pub use crate::{
        CacheProvider, CliCommandContributor, ConfigurationProvider, ContentExtractor,
        ContentFetcher, ContentSource, DataStoreProvider, LifecycleAction, Registered, Registry,
        RegistryError, ResetAction, StateStoreProvider, TaskQueueProvider,
    };
}
