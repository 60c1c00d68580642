//! Error types for the docqa pipeline.
//!
//! This module defines a unified error enum covering every failure category
//! in the application: corpus loading, chunking configuration, index
//! persistence, the embedding and generation service boundaries, and the
//! ambient configuration/IO/serialization concerns.

use thiserror::Error;

/// Unified error type for the docqa pipeline.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Errors are propagated, never swallowed; the CLI presents each variant
/// as a distinct failure.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The corpus directory does not exist
    #[error("Corpus not found: {0}")]
    CorpusNotFound(String),

    /// Chunking parameters are inconsistent (e.g. overlap >= chunk size)
    #[error("Invalid chunk configuration: {0}")]
    InvalidChunkConfig(String),

    /// A persisted index exists but cannot be loaded.
    ///
    /// Recoverable by rebuilding the index (`docqa index --rebuild`).
    #[error("Failed to load index: {0}")]
    IndexLoad(String),

    /// The index storage backend failed while writing or querying
    #[error("Index storage error: {0}")]
    IndexStorage(String),

    /// The embedding service failed or timed out
    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    /// Query embedding dimensionality does not match the index
    #[error("Embedding dimension mismatch: index has {expected}, query produced {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The generation service failed or timed out
    #[error("Generation service error: {0}")]
    GenerationService(String),

    /// The query was empty or whitespace-only
    #[error("Query must not be empty")]
    EmptyQuery,

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
