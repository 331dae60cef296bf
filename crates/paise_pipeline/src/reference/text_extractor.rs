//! `PlainTextExtractor` — the fallback extractor for anything decodable
//! as UTF-8 text.

use paise_host::ExtractorHost;
use paise_model::{Content, Metadata, PaiseError, ProcessingState};
use paise_registry::ContentExtractor;

/// Accepts any content it can decode as text. Registered last, so more
/// specific extractors (e.g. [`crate::reference::HtmlExtractor`]) get the
/// first chance to claim a MIME type.
pub struct PlainTextExtractor;

impl ContentExtractor for PlainTextExtractor {
    fn can_extract(&self, _url: &str, _mime_type: Option<&str>) -> bool {
        true
    }

    fn preferred_mime_types(&self) -> &[&str] {
        &["text/plain"]
    }

    fn extract(&self, host: &ExtractorHost, content: &Content, metadata: &Metadata) -> Result<(), PaiseError> {
        let Some(text) = content.as_text() else {
            return Err(PaiseError::Permanent(format!(
                "content for {} is not valid UTF-8 text",
                metadata.source_url
            )));
        };
        let title = text.lines().next().unwrap_or_default();
        let stored = metadata
            .to_builder()
            .title(title)
            .mime_type(metadata.mime_type.clone().unwrap_or_else(|| "text/plain".to_string()))
            .processing_state(ProcessingState::Stored)
            .build();
        host.storage().add_item(stored, Some(content.clone()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::test_support::extractor_host;

    #[test]
    fn stores_first_line_as_title() {
        let host = extractor_host();
        let metadata = Metadata::new("file:///tmp/a.txt");
        let content = Content::Text("hello\nworld".to_string());
        PlainTextExtractor.extract(&host, &content, &metadata).unwrap();
        let stored = host.storage().get_by_source_url("file:///tmp/a.txt").unwrap().unwrap();
        assert_eq!(stored.title.as_deref(), Some("hello"));
        assert_eq!(stored.processing_state, ProcessingState::Stored);
    }

    #[test]
    fn rejects_invalid_utf8() {
        let host = extractor_host();
        let metadata = Metadata::new("file:///tmp/a.bin");
        let content = Content::Bytes(vec![0xff, 0xfe]);
        assert!(PlainTextExtractor.extract(&host, &content, &metadata).is_err());
    }
}
