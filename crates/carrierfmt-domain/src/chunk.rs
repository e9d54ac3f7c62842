//! Text chunks - bounded spans of source text

/// An immutable, ordered span of the source text
///
/// Chunks are produced by the extractor's chunker. `start..end` are byte
/// offsets into the original text; `overlap` is the number of leading bytes
/// shared with the predecessor chunk (always 0 for the first chunk).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Zero-based position in the chunk sequence
    pub index: usize,

    /// Byte offset of the first character in the source text
    pub start: usize,

    /// Byte offset of the cut point in the source text
    ///
    /// `text` is right-trimmed, so it may be shorter than `end - start`.
    pub end: usize,

    /// Bytes shared with the previous chunk
    pub overlap: usize,

    /// The chunk content
    pub text: String,
}

impl TextChunk {
    /// Create a chunk covering the whole input
    pub fn whole(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            index: 0,
            start: 0,
            end: text.len(),
            overlap: 0,
            text,
        }
    }

    /// Length of the chunk in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the chunk holds no text
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The part of this chunk not shared with the previous chunk
    pub fn fresh_text(&self) -> &str {
        let skip = self.overlap.min(self.text.len());
        // overlap always lands on a char boundary when produced by the chunker
        self.text.get(skip..).unwrap_or(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_chunk() {
        let chunk = TextChunk::whole("hello");
        assert_eq!(chunk.index, 0);
        assert_eq!(chunk.len(), 5);
        assert_eq!(chunk.fresh_text(), "hello");
    }

    #[test]
    fn test_fresh_text_skips_overlap() {
        let chunk = TextChunk {
            index: 1,
            start: 3,
            end: 8,
            overlap: 2,
            text: "lo wo".to_string(),
        };
        assert_eq!(chunk.fresh_text(), " wo");
    }
}
