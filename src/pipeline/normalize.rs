//! Content normalization: trim, reject empty input, bound the length.
//!
//! Limits are counted in characters, not bytes, so truncation never splits
//! a multi-byte code point (Turkish or accented input is common).

use crate::error::ConvertError;
use crate::output::{ExtractedContent, SourceKind};

/// Trimmed, non-empty text no longer than the limit it was bounded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedText {
    text: String,
    source_kind: SourceKind,
    truncated: bool,
}

impl BoundedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    /// `true` when the trimmed input exceeded the limit.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Trim `extracted`, fail on empty, truncate to `max_chars` characters.
pub fn normalize(
    extracted: &ExtractedContent,
    max_chars: usize,
) -> Result<BoundedText, ConvertError> {
    let trimmed = extracted.text.trim();
    if trimmed.is_empty() {
        return Err(ConvertError::EmptyContent);
    }
    let bounded = truncate_chars(trimmed, max_chars);
    Ok(BoundedText {
        truncated: bounded.len() < trimmed.len(),
        text: bounded.to_string(),
        source_kind: extracted.source_kind,
    })
}

/// Bound narration to the speech provider's input limit.
pub fn bound_for_speech(text: &str, max_chars: usize) -> &str {
    truncate_chars(text, max_chars)
}

/// First `max_chars` characters of `s`.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pasted(text: &str) -> ExtractedContent {
        ExtractedContent::new(text, SourceKind::PastedText)
    }

    #[test]
    fn short_text_is_trimmed_only() {
        let b = normalize(&pasted("  Hello world \n"), 4000).unwrap();
        assert_eq!(b.as_str(), "Hello world");
        assert!(!b.was_truncated());
    }

    #[test]
    fn long_text_keeps_first_4000_chars() {
        let text: String = (0..5000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let b = normalize(&pasted(&text), 4000).unwrap();
        assert_eq!(b.as_str().chars().count(), 4000);
        assert_eq!(b.as_str(), &text[..4000]);
        assert!(b.was_truncated());
    }

    #[test]
    fn exactly_at_limit_is_untouched() {
        let text = "x".repeat(4000);
        let b = normalize(&pasted(&text), 4000).unwrap();
        assert_eq!(b.as_str(), text);
        assert!(!b.was_truncated());
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "ş".repeat(10);
        assert_eq!(truncate_chars(&text, 4), "şşşş");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn whitespace_only_is_empty_content() {
        for text in ["", "   ", "\n\t \r\n"] {
            assert!(
                matches!(normalize(&pasted(text), 4000), Err(ConvertError::EmptyContent)),
                "{text:?}"
            );
        }
    }

    #[test]
    fn speech_bound_is_independent() {
        let narration = "n".repeat(5000);
        assert_eq!(bound_for_speech(&narration, 4096).len(), 4096);
        assert_eq!(bound_for_speech("short", 4096), "short");
    }

    #[test]
    fn source_kind_is_carried() {
        let b = normalize(&ExtractedContent::new("x", SourceKind::WordDocument), 10).unwrap();
        assert_eq!(b.source_kind(), SourceKind::WordDocument);
    }
}
