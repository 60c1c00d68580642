//! Index command handler.
//!
//! Builds the vector index from the corpus, or reports that a persisted
//! index already exists. `--rebuild` discards the existing index first;
//! it is the only path that refreshes a stale index.

use clap::Args;
use docqa_core::{config::AppConfig, AppResult};
use docqa_rag::index::VectorIndex;
use docqa_rag::types::IndexOrigin;
use docqa_rag::{chunker, corpus, embeddings};

/// Build the vector index
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Discard any existing index and re-embed the corpus
    #[arg(long)]
    pub rebuild: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing index command (rebuild: {})", self.rebuild);

        config.validate()?;

        if self.rebuild && config.index_path.exists() {
            tracing::info!("Removing existing index at {:?}", config.index_path);
            std::fs::remove_file(&config.index_path)?;
        }

        let documents = corpus::load_documents(&config.corpus_dir)?;
        let chunks =
            chunker::chunk_documents(&documents, config.chunk_size, config.chunk_overlap)?;

        let embedder = embeddings::create_embedder(&config.embedding)?;
        let (index, origin) = VectorIndex::open_or_build(
            &config.index_path,
            &chunks,
            embedder.as_ref(),
            &config.embedding,
        )
        .await?;

        let stats = index.stats();

        if self.json {
            let output = serde_json::json!({
                "origin": origin,
                "documents": documents.len(),
                "chunks": stats.chunk_count,
                "dimensions": stats.dimensions,
                "model": stats.model,
                "path": config.index_path,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        match origin {
            IndexOrigin::Built => println!(
                "Built index at {} ({} documents, {} chunks, {} dimensions)",
                config.index_path.display(),
                documents.len(),
                stats.chunk_count,
                stats.dimensions
            ),
            IndexOrigin::Loaded => println!(
                "Index at {} already exists ({} chunks); use --rebuild to re-embed",
                config.index_path.display(),
                stats.chunk_count
            ),
        }

        Ok(())
    }
}
