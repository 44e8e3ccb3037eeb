use serde::Serialize;
use uuid::Uuid;

use crate::core::config::RagConfig;

/// A text window cut from one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentChunk {
    pub chunk_id: Uuid,
    /// Name of the uploaded document
    pub document: String,
    pub text: String,
    /// Character offset in the extracted text
    pub start_offset: usize,
    /// Chunk index within the document
    pub chunk_index: usize,
}

/// Splits text into overlapping character windows.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
    max_chunks: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize, max_chunks: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
            max_chunks,
        }
    }

    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap, config.max_chunks)
    }

    /// Windows of up to `chunk_size` chars, each overlapping the previous one by
    /// `chunk_overlap`. A window is cut back to a sentence end when one falls in
    /// its last 20%; the next window starts `chunk_overlap` chars before the cut.
    pub fn split(&self, text: &str, document: &str) -> Vec<DocumentChunk> {
        let mut chunks = Vec::new();
        let chars: Vec<char> = text.chars().collect();
        let total_chars = chars.len();

        if total_chars == 0 {
            return chunks;
        }

        let mut start = 0;
        let mut chunk_index = 0;

        while start < total_chars && chunks.len() < self.max_chunks {
            let end = (start + self.chunk_size).min(total_chars);
            let window: String = chars[start..end].iter().collect();

            let final_text = if end < total_chars {
                cut_at_sentence_boundary(&window)
            } else {
                window.as_str()
            };

            let trimmed = final_text.trim();
            if !trimmed.is_empty() {
                chunks.push(DocumentChunk {
                    chunk_id: Uuid::new_v4(),
                    document: document.to_string(),
                    text: trimmed.to_string(),
                    start_offset: start,
                    chunk_index,
                });
                chunk_index += 1;
            }

            if end == total_chars {
                break;
            }
            let cut_chars = final_text.chars().count();
            start += cut_chars.saturating_sub(self.chunk_overlap).max(1);
        }

        chunks
    }
}

fn cut_at_sentence_boundary(text: &str) -> &str {
    let sentence_endings = [". ", "! ", "? ", ".\n", "!\n", "?\n"];

    let mut search_start = (text.len() * 80) / 100;
    while !text.is_char_boundary(search_start) {
        search_start += 1;
    }
    let search_text = &text[search_start..];

    for ending in sentence_endings.iter() {
        if let Some(pos) = search_text.rfind(ending) {
            let cut_pos = search_start + pos + ending.len();
            return &text[..cut_pos];
        }
    }

    text
}
