//! Fetcher and extractor selection. Both follow registration order;
//! extractor selection additionally prefers a MIME match.

use paise_registry::{ContentExtractor, ContentFetcher, Registered, Registry};

/// Selects the first registered fetcher whose `can_fetch(url)` is true.
pub(crate) fn select_fetcher(registry: &Registry, url: &str) -> Option<Registered<dyn ContentFetcher>> {
    registry.content_fetchers().into_iter().find(|r| r.value.can_fetch(url))
}

/// Selects an extractor in two passes: first among extractors whose
/// `preferred_mime_types()` contains `mime_type`, taking the first (in
/// registration order) whose `can_extract` agrees; then, if none matched,
/// the first extractor overall whose `can_extract` agrees.
pub(crate) fn select_extractor(
    registry: &Registry,
    url: &str,
    mime_type: Option<&str>,
) -> Option<Registered<dyn ContentExtractor>> {
    let extractors = registry.content_extractors();

    if let Some(mime) = mime_type {
        if let Some(found) = extractors
            .iter()
            .find(|r| r.value.preferred_mime_types().contains(&mime) && r.value.can_extract(url, Some(mime)))
        {
            return Some(found.clone());
        }
    }

    extractors.into_iter().find(|r| r.value.can_extract(url, mime_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use paise_host::ExtractorHost;
    use paise_model::{Content, Metadata, PaiseError, PluginIdentity};

    struct Generic;
    impl ContentExtractor for Generic {
        fn can_extract(&self, _url: &str, _mime: Option<&str>) -> bool {
            true
        }
        fn preferred_mime_types(&self) -> &[&str] {
            &["text/plain"]
        }
        fn extract(&self, _h: &ExtractorHost, _c: &Content, _m: &Metadata) -> Result<(), PaiseError> {
            Ok(())
        }
    }

    struct Html;
    impl ContentExtractor for Html {
        fn can_extract(&self, _url: &str, mime: Option<&str>) -> bool {
            mime == Some("text/html")
        }
        fn preferred_mime_types(&self) -> &[&str] {
            &["text/html"]
        }
        fn extract(&self, _h: &ExtractorHost, _c: &Content, _m: &Metadata) -> Result<(), PaiseError> {
            Ok(())
        }
    }

    #[test]
    fn mime_preference_wins_over_registration_order() {
        let registry = Registry::new();
        registry.open_consumer_phase();
        registry
            .register_content_extractor(PluginIdentity::new("p.generic"), std::sync::Arc::new(Generic), 5)
            .unwrap();
        registry
            .register_content_extractor(PluginIdentity::new("p.html"), std::sync::Arc::new(Html), 5)
            .unwrap();

        let selected = select_extractor(&registry, "http://x", Some("text/html")).unwrap();
        assert_eq!(selected.identity.as_str(), "p.html");
    }

    #[test]
    fn falls_back_to_first_can_extract_without_mime_match() {
        let registry = Registry::new();
        registry.open_consumer_phase();
        registry
            .register_content_extractor(PluginIdentity::new("p.generic"), std::sync::Arc::new(Generic), 5)
            .unwrap();
        registry
            .register_content_extractor(PluginIdentity::new("p.html"), std::sync::Arc::new(Html), 5)
            .unwrap();

        let selected = select_extractor(&registry, "http://x", Some("application/octet-stream")).unwrap();
        assert_eq!(selected.identity.as_str(), "p.generic");
    }
}
