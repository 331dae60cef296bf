//! The four canonical task functions (`fetch_content`, `extract_content`,
//! `store_content`, `cleanup_cache`) and, behind the `reference-plugins`
//! feature, a handful of trivial file/HTML/text plugins that exercise them
//! end to end.

mod completion;
mod error;
mod selection;
mod tasks;

#[cfg(feature = "reference-plugins")]
pub mod reference;

pub use tasks::register_pipeline_tasks;

/// Common imports for crates consuming the pipeline layer.
pub mod prelude {
    pub use crate::register_pipeline_tasks;
    #[cfg(feature = "reference-plugins")]
    pub use crate::reference::{FileContentFetcher, FileContentSource, HtmlExtractor, PlainTextExtractor};
}
