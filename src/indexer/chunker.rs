use crate::error::ChunkingError;
use crate::types::{Chunk, ChunkOrigin, Document};
use std::sync::Arc;

/// Splits documents into bounded, optionally overlapping windows of text
///
/// Sizes count chars. Text is cut only at whitespace boundaries: a run of
/// non-whitespace together with the whitespace that follows it is never
/// split, even when it alone exceeds `chunk_size`.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 0,
        }
    }
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ChunkingError> {
        if chunk_size == 0 {
            return Err(ChunkingError::InvalidChunkSize(
                "chunk size must be greater than 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(ChunkingError::OverlapTooLarge {
                overlap: chunk_overlap,
                size: chunk_size,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Chunk every document independently, preserving document order
    pub fn chunk_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for (document, doc) in documents.iter().enumerate() {
            let source_path: Arc<str> = Arc::from(doc.source_path.as_str());
            for (index, text) in self.split_text(&doc.raw_text).into_iter().enumerate() {
                chunks.push(Chunk {
                    text,
                    origin: ChunkOrigin {
                        source_path: Arc::clone(&source_path),
                        document,
                        index,
                    },
                });
            }
        }

        tracing::debug!(
            "Chunked {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );
        chunks
    }

    /// Split one text into windows
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut window = String::new();
        let mut window_len = 0;
        // Whether the window holds anything beyond the carried overlap
        let mut has_new = false;

        for unit in units(text) {
            let unit_len = unit.chars().count();

            if window_len + unit_len > self.chunk_size && has_new {
                push_chunk(&mut out, &window);
                window = tail_chars(&window, self.chunk_overlap).to_string();
                window_len = window.chars().count();
                has_new = false;
            }

            if window_len + unit_len > self.chunk_size {
                // Only carried text precedes this unit; shorten it to make room
                let keep = self.chunk_size.saturating_sub(unit_len);
                window = tail_chars(&window, keep).to_string();
                window_len = window.chars().count();
            }

            window.push_str(unit);
            window_len += unit_len;
            has_new = true;
        }

        if has_new {
            push_chunk(&mut out, &window);
        }

        out
    }
}

fn push_chunk(out: &mut Vec<String>, window: &str) {
    if !window.trim().is_empty() {
        out.push(window.to_string());
    }
}

/// Atomic pieces of `text`: non-whitespace plus trailing whitespace
///
/// Leading whitespace is attached to the first piece, so the pieces always
/// concatenate back to `text`.
fn units(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut seen_word = false;
    let mut in_space = false;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            in_space = true;
        } else {
            if seen_word && in_space {
                units.push(&text[start..i]);
                start = i;
            }
            seen_word = true;
            in_space = false;
        }
    }

    if start < text.len() {
        units.push(&text[start..]);
    }
    units
}

/// The last `n` chars of `s`
fn tail_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    s.char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| &s[i..])
        .unwrap_or(s)
}
