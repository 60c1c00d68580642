//! Text chunking with bounded size and exact overlap.
//!
//! Documents are split into overlapping windows of at most `max_chars`
//! characters. The window end prefers natural boundaries (paragraph break,
//! then sentence end, then word boundary) before falling back to a hard
//! character cut; the next window always starts exactly `overlap`
//! characters before the previous cut, so consecutive chunks of a document
//! share exactly `overlap` characters regardless of which boundary was
//! chosen. The boundary preference is a heuristic, not a guarantee.

use crate::types::{Chunk, Document};
use docqa_core::{AppError, AppResult};

/// Chunk a sequence of documents.
///
/// Document order and chunk order within each document are preserved; the
/// result is flattened across documents. Empty documents yield zero
/// chunks.
pub fn chunk_documents(
    documents: &[Document],
    max_chars: usize,
    overlap: usize,
) -> AppResult<Vec<Chunk>> {
    if max_chars == 0 {
        return Err(AppError::InvalidChunkConfig(
            "chunk size must be positive".to_string(),
        ));
    }

    if overlap >= max_chars {
        return Err(AppError::InvalidChunkConfig(format!(
            "overlap ({}) must be smaller than chunk size ({})",
            overlap, max_chars
        )));
    }

    let chunks: Vec<Chunk> = documents
        .iter()
        .flat_map(|doc| chunk_text(&doc.name, &doc.text, max_chars, overlap))
        .collect();

    tracing::debug!(
        "Chunked {} documents into {} chunks (size: {}, overlap: {})",
        documents.len(),
        chunks.len(),
        max_chars,
        overlap
    );

    Ok(chunks)
}

/// Chunk a single text into overlapping segments.
///
/// Callers must guarantee `overlap < max_chars` (checked by
/// [`chunk_documents`]); this keeps the window advancing and the function
/// terminating on any input.
fn chunk_text(source: &str, text: &str, max_chars: usize, overlap: usize) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    if total == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut position = 0u32;
    let mut start = 0usize;

    loop {
        let hard_end = (start + max_chars).min(total);
        let end = if hard_end < total {
            find_break(&chars, start + overlap + 1, hard_end)
        } else {
            total
        };

        chunks.push(Chunk {
            source: source.to_string(),
            position,
            offset: start,
            text: chars[start..end].iter().collect(),
        });

        if end >= total {
            break;
        }

        position += 1;
        // Exact overlap: the next window begins `overlap` chars before the cut
        start = end - overlap;
    }

    chunks
}

/// Find the best cut point in `(min_end, hard_end]`, scanning backwards.
///
/// Preference order: paragraph break, sentence end, word boundary, hard
/// cut. `min_end` keeps the cut far enough from the window start that the
/// next window still advances.
fn find_break(chars: &[char], min_end: usize, hard_end: usize) -> usize {
    // Paragraph break: cut after a blank line
    for end in (min_end..=hard_end).rev() {
        if end >= 2 && chars[end - 1] == '\n' && chars[end - 2] == '\n' {
            return end;
        }
    }

    // Sentence end: punctuation followed by whitespace
    for end in (min_end..=hard_end).rev() {
        if end < chars.len()
            && matches!(chars[end - 1], '.' | '!' | '?')
            && chars[end].is_whitespace()
        {
            return end;
        }
    }

    // Word boundary: cut after whitespace
    for end in (min_end..=hard_end).rev() {
        if chars[end - 1].is_whitespace() {
            return end;
        }
    }

    hard_end
}
