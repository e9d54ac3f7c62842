//! Boundary-aware text chunking for large documents

use crate::config::ExtractorConfig;
use carrierfmt_domain::TextChunk;

/// Splits oversized text into bounded, ordered chunks
///
/// Each window of `max_chars` bytes is cut at its last paragraph break,
/// else its last line break, else at the window end. Consecutive chunks
/// share `overlap` bytes so content cut at a boundary is seen twice rather
/// than never.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_chars: i64,
    overlap: usize,
}

/// A raw cut of the source text, before trimming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a new text chunker
    ///
    /// `max_chars <= 0` disables chunking.
    pub fn new(max_chars: i64, overlap: usize) -> Self {
        Self { max_chars, overlap }
    }

    /// Create a chunker from the extractor configuration
    pub fn from_config(config: &ExtractorConfig) -> Self {
        Self::new(config.max_chars_per_chunk, config.chunk_overlap_chars)
    }

    /// Split the given text into chunks
    pub fn split(&self, text: &str) -> Vec<TextChunk> {
        if text.is_empty() {
            return Vec::new();
        }
        if self.max_chars <= 0 || text.len() as u64 <= self.max_chars as u64 {
            return vec![TextChunk::whole(text)];
        }

        let mut chunks = Vec::new();
        for span in self.spans(text) {
            let body = text[span.start..span.end].trim_end();
            if body.is_empty() {
                continue;
            }
            chunks.push(TextChunk {
                index: chunks.len(),
                start: span.start,
                end: span.end,
                overlap: span.overlap,
                text: body.to_string(),
            });
        }

        // Whitespace-only input
        if chunks.is_empty() {
            return vec![TextChunk::whole(text)];
        }
        chunks
    }

    fn spans(&self, text: &str) -> Vec<Span> {
        let len = text.len();
        let max = self.max_chars.max(1) as usize;
        let mut spans = Vec::new();
        let mut start = 0;
        let mut shared = 0;

        while start < len {
            let end = if len - start <= max {
                len
            } else {
                let mut hard = floor_boundary(text, start + max);
                if hard <= start {
                    // window narrower than one character
                    hard = ceil_boundary(text, start + 1);
                }
                let window = &text[start..hard];
                if let Some(pos) = window.rfind("\n\n") {
                    start + pos + 2
                } else if let Some(pos) = window.rfind('\n') {
                    start + pos + 1
                } else {
                    hard
                }
            };

            spans.push(Span {
                start,
                end,
                overlap: shared,
            });
            if end >= len {
                break;
            }

            let mut next = floor_boundary(text, end.saturating_sub(self.overlap));
            if next <= start {
                next = end;
            }
            shared = end - next;
            start = next;
        }

        spans
    }
}

fn floor_boundary(text: &str, idx: usize) -> usize {
    let mut i = idx.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_boundary(text: &str, idx: usize) -> usize {
    let mut i = idx.min(text.len());
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_chunk_when_under_limit() {
        let chunks = TextChunker::new(100, 0).split("short");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short");
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(TextChunker::new(10, 0).split("").is_empty());

        let chunks = TextChunker::new(2, 0).split("  \n  ");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "  \n  ");
    }

    #[test]
    fn test_disabled_chunking() {
        let text = "x".repeat(1_000);
        assert_eq!(TextChunker::new(0, 0).split(&text).len(), 1);
        assert_eq!(TextChunker::new(-5, 0).split(&text).len(), 1);
        assert!(TextChunker::new(0, 0).split("").is_empty());
    }

    #[test]
    fn test_splits_on_paragraph_boundary() {
        let a = "a".repeat(50);
        let b = "b".repeat(50);
        let text = format!("{}\n\n{}", a, b);

        let chunks = TextChunker::new(60, 0).split(&text);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, a);
        assert_eq!(chunks[1].text, b);
    }

    #[test]
    fn test_prefers_paragraph_over_line_break() {
        let text = format!("{}\n\n{}\n{}", "a".repeat(10), "b".repeat(10), "c".repeat(30));
        let chunks = TextChunker::new(40, 0).split(&text);
        assert_eq!(chunks[0].text, "a".repeat(10));
    }

    #[test]
    fn test_splits_on_line_boundary_when_no_paragraph() {
        let lines: Vec<String> = (0..30).map(|i| format!("line{}", i)).collect();
        let text = lines.join("\n");

        let chunks = TextChunker::new(50, 0).split(&text);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.len() <= 50);
            assert!(!chunk.text.ends_with('\n'));
            assert!(chunk.text.starts_with("line"));
        }
    }

    #[test]
    fn test_hard_cut_without_breaks() {
        let text = "x".repeat(200);
        let chunks = TextChunker::new(50, 0).split(&text);
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.len() == 50));
    }

    #[test]
    fn test_overlap_is_shared_with_predecessor() {
        let text = "x".repeat(250_000);
        let chunks = TextChunker::new(100_000, 500).split(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].overlap, 0);
        assert_eq!(chunks[1].start, 99_500);
        assert_eq!(chunks[1].overlap, 500);
        assert_eq!(chunks[2].end, 250_000);
    }

    #[test]
    fn test_terminates_when_overlap_exceeds_window() {
        let text = "abcdefghij".repeat(10);
        let chunks = TextChunker::new(10, 50).split(&text);
        assert_eq!(chunks.len(), 10);
        assert!(chunks.iter().all(|c| c.overlap == 0));
    }

    #[test]
    fn test_multibyte_text_is_cut_on_char_boundaries() {
        let text = "é".repeat(30);
        let chunks = TextChunker::new(7, 2).split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.chars().all(|c| c == 'é'));
            assert!(chunk.len() <= 7);
        }
    }

    #[test]
    fn test_fresh_text_reassembles_source_without_trailing_whitespace() {
        let text = "one\n\ntwo\n\nthree";
        let chunks = TextChunker::new(6, 1).split(text);
        let joined: String = chunks.iter().map(|c| c.fresh_text()).collect::<Vec<_>>().join("");
        assert!(joined.contains("one"));
        assert!(joined.contains("two"));
        assert!(joined.ends_with("three"));
    }

    proptest! {
        #[test]
        fn prop_spans_cover_text_exactly_once(
            text in "[a-zé \n]{0,400}",
            max in 1i64..80,
            overlap in 0usize..100,
        ) {
            let chunker = TextChunker::new(max, overlap);
            let spans = chunker.spans(&text);

            let mut rebuilt = String::new();
            for span in &spans {
                rebuilt.push_str(&text[span.start + span.overlap..span.end]);
                // 'é' is two bytes, so a window of one byte still holds one character
                prop_assert!(span.end - span.start <= (max as usize).max(2));
            }
            prop_assert_eq!(rebuilt, text);
        }

        #[test]
        fn prop_chunk_text_is_trimmed_span(
            text in "[a-z \n]{1,300}",
            max in 1i64..60,
            overlap in 0usize..20,
        ) {
            let chunks = TextChunker::new(max, overlap).split(&text);
            prop_assert!(!chunks.is_empty());
            if text.len() as i64 > max && !text.trim().is_empty() {
                for (i, chunk) in chunks.iter().enumerate() {
                    prop_assert_eq!(chunk.index, i);
                    prop_assert_eq!(chunk.text.as_str(), text[chunk.start..chunk.end].trim_end());
                }
            }
        }

        #[test]
        fn prop_chunking_is_deterministic(
            text in "[a-z \n]{0,300}",
            max in 1i64..60,
            overlap in 0usize..20,
        ) {
            let chunker = TextChunker::new(max, overlap);
            prop_assert_eq!(chunker.split(&text), chunker.split(&text));
        }
    }
}
