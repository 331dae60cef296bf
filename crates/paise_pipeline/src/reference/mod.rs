//! Trivial reference plugins: a directory walker, a `file://` fetcher, and
//! plain-text/HTML extractors. Gated behind the `reference-plugins`
//! feature (on by default) so a deployment that brings its own consumer
//! plugins can build without them.

mod file_fetcher;
mod file_source;
mod html_extractor;
mod text_extractor;

pub use file_fetcher::FileContentFetcher;
pub use file_source::FileContentSource;
pub use html_extractor::HtmlExtractor;
pub use text_extractor::PlainTextExtractor;
