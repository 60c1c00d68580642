//! Embedding provider trait and factory.

use docqa_core::config::EmbeddingSettings;
use docqa_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
///
/// Implementations must be deterministic: identical input text yields an
/// identical vector, with fixed dimensionality per model configuration.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensionality
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in one call, order-preserving.
    async fn embed_many(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate an embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_many(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::EmbeddingService("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from settings.
///
/// Construction is passive: no provider performs network calls here, so an
/// index load can never touch the embedding service.
pub fn create_embedder(settings: &EmbeddingSettings) -> AppResult<Arc<dyn Embedder>> {
    match settings.provider.to_lowercase().as_str() {
        "trigram" => {
            let provider = super::providers::trigram::TrigramEmbedder::new(settings.dimensions);
            Ok(Arc::new(provider))
        }

        "ollama" => {
            let provider = super::providers::ollama::OllamaEmbedder::new(settings)?;
            Ok(Arc::new(provider))
        }

        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            other
        ))),
    }
}
