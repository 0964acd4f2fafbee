//! Fixed-size context windows over document text.
//!
//! Windows are cut every `chunk_size` characters with no overlap and no
//! word-boundary awareness, so a word can straddle two chunks. Offsets and
//! lengths count `char`s, so a multibyte code point is never split.

use docqa_shared::{DocQaError, Result};

/// Window size used when nothing else is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// A contiguous slice of the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position in the chunk sequence.
    pub index: usize,
    /// Offset of the first character within the document, in chars.
    pub start: usize,
    pub text: &'a str,
}

impl<'a> Chunk<'a> {
    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split `text` into consecutive windows of at most `chunk_size` characters.
///
/// Concatenating the returned chunks reproduces `text` exactly. Empty text
/// yields no chunks.
pub fn split(text: &str, chunk_size: usize) -> Result<Vec<Chunk<'_>>> {
    if chunk_size == 0 {
        return Err(DocQaError::invalid_input("chunk size must be at least 1"));
    }

    let mut chunks = Vec::new();
    let mut start_byte = 0;
    let mut start_char = 0;
    let mut count = 0;

    for (byte_idx, _) in text.char_indices() {
        if count == chunk_size {
            chunks.push(Chunk {
                index: chunks.len(),
                start: start_char,
                text: &text[start_byte..byte_idx],
            });
            start_byte = byte_idx;
            start_char += count;
            count = 0;
        }
        count += 1;
    }

    if count > 0 {
        chunks.push(Chunk {
            index: chunks.len(),
            start: start_char,
            text: &text[start_byte..],
        });
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejoin(chunks: &[Chunk<'_>]) -> String {
        chunks.iter().map(|c| c.text).collect()
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(split("", 10).unwrap().is_empty());
    }

    #[test]
    fn zero_chunk_size_is_invalid() {
        let err = split("some text", 0).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = split("hello world", DEFAULT_CHUNK_SIZE).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world");
        assert_eq!(chunks[0].start, 0);
    }

    #[test]
    fn concatenation_reproduces_text() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(97);
        for size in [1, 2, 7, 64, 2000, 5000] {
            let chunks = split(&text, size).unwrap();
            assert_eq!(rejoin(&chunks), text, "size {size}");
        }
    }

    #[test]
    fn all_but_last_chunk_are_full() {
        let text = "x".repeat(4505);
        let chunks = split(&text, 2000).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].char_len(), 2000);
        assert_eq!(chunks[1].char_len(), 2000);
        assert_eq!(chunks[2].char_len(), 4505 % 2000);
        assert_eq!(chunks[2].start, 4000);
        assert_eq!(chunks[2].index, 2);
    }

    #[test]
    fn exact_multiple_ends_with_full_chunk() {
        let text = "ab".repeat(50);
        let chunks = split(&text, 25).unwrap();
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.char_len() == 25));
    }

    #[test]
    fn words_may_straddle_chunks() {
        let chunks = split("photosynthesis", 5).unwrap();
        let parts: Vec<&str> = chunks.iter().map(|c| c.text).collect();
        assert_eq!(parts, vec!["photo", "synth", "esis"]);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "naïve café — résumé ✓ 日本語のテキスト";
        let chunks = split(text, 3).unwrap();
        assert_eq!(rejoin(&chunks), text);
        let last = chunks.last().unwrap();
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.char_len(), 3);
        }
        assert!(last.char_len() >= 1 && last.char_len() <= 3);
        assert_eq!(chunks[1].start, 3);
    }
}
