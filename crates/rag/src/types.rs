//! Pipeline type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw text document loaded from the corpus.
///
/// Immutable once loaded; consumed by chunking and discarded afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Source name (file path relative to the corpus root)
    pub name: String,

    /// Raw text content
    pub text: String,
}

/// A bounded-length text segment derived from a document; the unit of
/// retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Source document name
    pub source: String,

    /// Position within the source document (0-based)
    pub position: u32,

    /// Character offset of the chunk start within the source document
    pub offset: usize,

    /// Text content
    pub text: String,
}

/// A chunk returned from retrieval, with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Source document name
    pub source: String,

    /// Position within the source document
    pub position: u32,

    /// Text content
    pub text: String,

    /// Cosine similarity to the query vector
    pub score: f32,
}

/// A generated answer, kept together with the exact context that grounded
/// it so the caller can audit what the generation service saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundedAnswer {
    /// Raw text output of the generation service
    pub answer: String,

    /// The exact context string supplied to the generation service
    pub context: String,

    /// Retrieved chunks, best-first
    pub chunks: Vec<RetrievedChunk>,
}

/// How the index was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexOrigin {
    /// Deserialized from the persistence path; no embedding calls made
    Loaded,

    /// Freshly embedded, built and persisted
    Built,
}

/// Metadata describing a persisted index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Embedding vector dimensionality
    pub dimensions: usize,

    /// Embedding model identifier recorded at build time
    pub model: String,

    /// Number of chunks in the index
    pub chunk_count: u32,

    /// When the index was built
    pub built_at: DateTime<Utc>,

    /// Digest of the corpus content the index was built from
    pub corpus_digest: String,
}
