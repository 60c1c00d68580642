//! Grounded question answering over a fixed document corpus.
//!
//! The pipeline turns raw documents into overlapping chunks, builds or
//! reuses a persisted vector index over their embeddings, retrieves the
//! chunks most similar to a query, and asks a generation service to answer
//! strictly from that retrieved context.
//!
//! The embedding and generation services are injected behind the
//! [`embeddings::Embedder`] and [`docqa_llm::Generator`] traits, so the
//! pipeline's correctness never depends on a specific external provider.

pub mod answer;
pub mod chunker;
pub mod corpus;
pub mod embeddings;
pub mod index;
pub mod retriever;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use types::{Chunk, Document, GroundedAnswer, IndexOrigin, IndexStats, RetrievedChunk};

use docqa_core::{AppConfig, AppResult};
use docqa_llm::Generator;
use embeddings::Embedder;
use index::VectorIndex;
use std::sync::Arc;

/// The question-answering pipeline.
///
/// Construction runs the one-time half of the data flow (load documents →
/// chunk → load-or-build index); [`Pipeline::answer`] runs the per-query
/// half (retrieve → grounded generation). Stateless per query; the only
/// persistent state is the index.
pub struct Pipeline {
    config: AppConfig,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    template: Option<String>,
    index: VectorIndex,
    origin: IndexOrigin,
}

impl Pipeline {
    /// Open the pipeline with injected service providers.
    pub async fn open(
        config: AppConfig,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> AppResult<Self> {
        config.validate()?;

        let documents = corpus::load_documents(&config.corpus_dir)?;
        let chunks =
            chunker::chunk_documents(&documents, config.chunk_size, config.chunk_overlap)?;

        let template = match &config.prompt_template {
            Some(path) => Some(docqa_prompt::load_template(path)?),
            None => None,
        };

        let (index, origin) = VectorIndex::open_or_build(
            &config.index_path,
            &chunks,
            embedder.as_ref(),
            &config.embedding,
        )
        .await?;

        tracing::info!(
            "Pipeline ready: {} documents, {} chunks, index {:?} ({} entries)",
            documents.len(),
            chunks.len(),
            origin,
            index.len()
        );

        Ok(Self {
            config,
            embedder,
            generator,
            template,
            index,
            origin,
        })
    }

    /// Open the pipeline, constructing providers from the configuration.
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let embedder = embeddings::create_embedder(&config.embedding)?;
        let api_key = config.resolve_api_key();
        let generator = docqa_llm::create_generator(&config.generation, api_key.as_deref())?;

        Self::open(config, embedder, generator).await
    }

    /// Answer a query from the corpus.
    ///
    /// Retrieves the `top_k` most relevant chunks and generates an answer
    /// grounded strictly in them. An empty query fails with
    /// `AppError::EmptyQuery` before any service call.
    pub async fn answer(&self, query: &str, top_k: usize) -> AppResult<GroundedAnswer> {
        let retrieved =
            retriever::retrieve(&self.index, self.embedder.as_ref(), query, top_k).await?;

        answer::answer_grounded(
            self.generator.as_ref(),
            &self.config.generation,
            self.template.as_deref(),
            query,
            &retrieved,
        )
        .await
    }

    /// How the index was obtained at open time.
    pub fn origin(&self) -> IndexOrigin {
        self.origin
    }

    /// Metadata of the underlying index.
    pub fn index_stats(&self) -> &IndexStats {
        self.index.stats()
    }

    /// The configured default number of chunks to retrieve.
    pub fn default_top_k(&self) -> usize {
        self.config.top_k
    }
}
