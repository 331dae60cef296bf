//! Content carried by value through the pipeline.

use serde::{Deserialize, Serialize};

/// Either a byte sequence or a text string.
///
/// Fetchers typically produce [`Content::Bytes`]; extractors that already
/// work with decoded text produce [`Content::Text`]. The pipeline never
/// silently re-encodes one into the other — the extractor choosing a
/// variant is the one deciding what a downstream `add_item` call stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    /// Raw bytes, typically the unmodified response body of a fetch.
    Bytes(Vec<u8>),
    /// Decoded text.
    Text(String),
}

impl Content {
    /// Returns the content as bytes, encoding text as UTF-8 if necessary.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Bytes(b) => b,
            Content::Text(s) => s.as_bytes(),
        }
    }

    /// Returns the content as text if it is valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            Content::Bytes(b) => core::str::from_utf8(b).ok(),
        }
    }

    /// Byte length of the underlying payload.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Content::Bytes(b) => b.len(),
            Content::Text(s) => s.len(),
        }
    }

    /// True if the underlying payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<u8>> for Content {
    fn from(value: Vec<u8>) -> Self {
        Content::Bytes(value)
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_as_text_decodes_utf8() {
        let c = Content::Bytes(b"hello".to_vec());
        assert_eq!(c.as_text(), Some("hello"));
    }

    #[test]
    fn invalid_utf8_bytes_have_no_text_view() {
        let c = Content::Bytes(vec![0xff, 0xfe]);
        assert_eq!(c.as_text(), None);
    }

    #[test]
    fn len_and_is_empty() {
        assert_eq!(Content::Text(String::new()).len(), 0);
        assert!(Content::Text(String::new()).is_empty());
        assert_eq!(Content::from(vec![1, 2, 3]).len(), 3);
    }
}
