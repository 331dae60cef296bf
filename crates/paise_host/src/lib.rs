//! SingletonSet, HostFactory, and the per-plugin host facades that project
//! the run's singletons with automatic `PluginIdentity`-based partitioning.

mod factory;
mod host;
mod logger;
mod partitioned;
mod singleton;

pub use factory::HostFactory;
pub use host::{DataStoreHost, ExtractorHost, FetcherHost, Host, LifecycleHost, ResetHost, SourceHost};
pub use logger::PluginLogger;
pub use partitioned::{CacheHandle, StateHandle};
pub use singleton::SingletonSet;

/// Common imports for crates consuming the host layer.
pub mod prelude {
    pub use crate::{
        CacheHandle, DataStoreHost, ExtractorHost, FetcherHost, Host, HostFactory, LifecycleHost,
        PluginLogger, ResetHost, SingletonSet, SourceHost, StateHandle,
    };
}
