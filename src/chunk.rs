//! Fixed-length splitting of text into message segments.
//!
//! Lengths are counted in Unicode scalar values, so a segment boundary never
//! falls inside a UTF-8 sequence.

use std::num::NonZeroUsize;

/// A bounded piece of a document, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSegment {
    /// Zero-based position of this segment in the document.
    pub index: usize,
    pub text: String,
}

impl MessageSegment {
    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split `text` into contiguous segments of at most `limit` characters.
///
/// Concatenating the segments in order reproduces `text`. Empty input yields
/// no segments.
pub fn chunk(text: &str, limit: NonZeroUsize) -> Vec<MessageSegment> {
    let limit = limit.get();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == limit {
            segments.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        segments.push(&text[start..]);
    }

    segments
        .into_iter()
        .enumerate()
        .map(|(index, text)| MessageSegment {
            index,
            text: text.to_string(),
        })
        .collect()
}

/// Cut `text` to at most `limit` characters as a single segment.
pub fn truncate(text: &str, limit: NonZeroUsize) -> MessageSegment {
    let end = text
        .char_indices()
        .nth(limit.get())
        .map_or(text.len(), |(offset, _)| offset);
    MessageSegment {
        index: 0,
        text: text[..end].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn joined(segments: &[MessageSegment]) -> String {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    fn assert_chunk_invariants(text: &str, n: usize) {
        let segments = chunk(text, limit(n));
        let chars = text.chars().count();

        assert_eq!(joined(&segments), text);
        assert!(segments.len() <= chars.div_ceil(n));
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.index, i);
            assert!(segment.char_len() <= n);
            assert!(!segment.text.is_empty());
        }
    }

    #[test]
    fn test_empty_text_yields_no_segments() {
        assert!(chunk("", limit(2000)).is_empty());
    }

    #[test]
    fn test_short_text_is_one_segment() {
        let segments = chunk("hello", limit(2000));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "hello");
    }

    #[test]
    fn test_exact_multiple() {
        let segments = chunk("abcdef", limit(3));
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["abc", "def"]);
    }

    #[test]
    fn test_remainder_in_last_segment() {
        let segments = chunk("abcdefg", limit(3));
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["abc", "def", "g"]);
    }

    #[test]
    fn test_limit_of_one() {
        let segments = chunk("a\nb", limit(1));
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].text, "\n");
    }

    #[test]
    fn test_multibyte_characters_are_not_split() {
        let text = "Zürich → München 🚀 Ω";
        for n in 1..=text.chars().count() + 1 {
            assert_chunk_invariants(text, n);
        }
        let segments = chunk("🚀🚀🚀", limit(2));
        assert_eq!(segments[0].text, "🚀🚀");
        assert_eq!(segments[1].text, "🚀");
    }

    #[test]
    fn test_invariants_over_report_sized_text() {
        let text: String = (0..500)
            .map(|i| format!("    - line {}: {}\n", i, i * 7))
            .collect();
        for n in [1, 7, 64, 1999, 2000, 2001, text.len(), text.len() + 10] {
            assert_chunk_invariants(&text, n);
        }
    }

    #[test]
    fn test_truncate_keeps_short_text() {
        let segment = truncate("short", limit(2000));
        assert_eq!(segment.index, 0);
        assert_eq!(segment.text, "short");
    }

    #[test]
    fn test_truncate_cuts_on_char_boundary() {
        assert_eq!(truncate("abcdef", limit(3)).text, "abc");
        assert_eq!(truncate("🚀Ωü🚀", limit(3)).text, "🚀Ωü");
        assert_eq!(truncate("🚀Ωü", limit(3)).text, "🚀Ωü");
    }
}
