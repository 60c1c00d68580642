//! Stats command handler.

use clap::Args;
use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_rag::index::{corpus_digest, VectorIndex};
use docqa_rag::{chunker, corpus};

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        if !config.index_path.exists() {
            return Err(AppError::IndexLoad(format!(
                "No index at {}. Run 'docqa index' first.",
                config.index_path.display()
            )));
        }

        let documents = corpus::load_documents(&config.corpus_dir)?;
        let chunks =
            chunker::chunk_documents(&documents, config.chunk_size, config.chunk_overlap)?;

        let index = VectorIndex::load(&config.index_path, &config.embedding, &chunks)?;
        let stats = index.stats();

        let in_sync = corpus_digest(&chunks) == stats.corpus_digest;
        let size_bytes = std::fs::metadata(&config.index_path)
            .map(|m| m.len())
            .unwrap_or(0);

        if self.json {
            let output = serde_json::json!({
                "path": config.index_path,
                "chunks": stats.chunk_count,
                "dimensions": stats.dimensions,
                "model": stats.model,
                "builtAt": stats.built_at.to_rfc3339(),
                "sizeBytes": size_bytes,
                "corpusInSync": in_sync,
                "corpusDocuments": documents.len(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Index: {}", config.index_path.display());
        println!("  chunks:      {}", stats.chunk_count);
        println!("  dimensions:  {}", stats.dimensions);
        println!("  model:       {}", stats.model);
        println!("  built at:    {}", stats.built_at.to_rfc3339());
        println!("  size:        {} bytes", size_bytes);
        println!("  corpus docs: {}", documents.len());

        if !in_sync {
            println!("  note: index does not match current corpus content; run 'docqa index --rebuild'");
        }

        Ok(())
    }
}
