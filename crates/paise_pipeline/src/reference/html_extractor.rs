//! `HtmlExtractor` — strips tags from HTML content and uses `<title>` (if
//! present) as the item's title.

use paise_host::ExtractorHost;
use paise_model::{Content, Metadata, PaiseError, ProcessingState};
use paise_registry::ContentExtractor;

/// Claims `text/html` specifically; a generic text extractor registered
/// alongside it falls back to everything else.
pub struct HtmlExtractor;

impl ContentExtractor for HtmlExtractor {
    fn can_extract(&self, _url: &str, mime_type: Option<&str>) -> bool {
        mime_type == Some("text/html")
    }

    fn preferred_mime_types(&self) -> &[&str] {
        &["text/html"]
    }

    fn extract(&self, host: &ExtractorHost, content: &Content, metadata: &Metadata) -> Result<(), PaiseError> {
        let Some(html) = content.as_text() else {
            return Err(PaiseError::Permanent(format!(
                "content for {} is not valid UTF-8 text",
                metadata.source_url
            )));
        };
        let title = extract_title(html).unwrap_or_default();
        let text = strip_tags(html);
        let stored = metadata
            .to_builder()
            .title(title)
            .mime_type("text/html")
            .processing_state(ProcessingState::Stored)
            .build();
        host.storage().add_item(stored, Some(Content::Text(text)))?;
        Ok(())
    }
}

fn extract_title(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let start = lower.find("<title>")? + "<title>".len();
    let end = lower[start..].find("</title>")? + start;
    Some(html[start..end].trim().to_string())
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::test_support::extractor_host;

    #[test]
    fn extracts_title_and_strips_tags() {
        let host = extractor_host();
        let metadata = Metadata::new("http://x/y.html");
        let content = Content::Text("<html><title>Hi</title><body>Hello</body></html>".to_string());
        HtmlExtractor.extract(&host, &content, &metadata).unwrap();
        let stored = host.storage().get_by_source_url("http://x/y.html").unwrap().unwrap();
        assert_eq!(stored.title.as_deref(), Some("Hi"));
    }

    #[test]
    fn does_not_claim_non_html() {
        assert!(!HtmlExtractor.can_extract("http://x", Some("text/plain")));
        assert!(HtmlExtractor.can_extract("http://x", Some("text/html")));
    }
}
