//! At-most-once-per-fingerprint suppression for `fetch_content`.

use paise_store::{DataStore, StoreError};

/// Canonicalizes a URL for fingerprinting: trims surrounding whitespace and
/// a single trailing slash. Intentionally conservative — the core does not
/// attempt full RFC 3986 normalization (case-folding scheme/host, percent-
/// decoding, etc.), since the data store already keys items by the literal
/// `source_url` a fetcher reports.
#[must_use]
pub fn canonicalize_url(url: &str) -> String {
    let trimmed = url.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

/// True if `fetch_content(url)` should be suppressed: an item already
/// exists at the canonicalized URL and its `processing_state` is terminal
/// (`stored` or `completed`).
pub fn should_suppress_fetch(data_store: &dyn DataStore, url: &str) -> Result<bool, StoreError> {
    let canonical = canonicalize_url(url);
    data_store.is_terminal(&canonical)
}
