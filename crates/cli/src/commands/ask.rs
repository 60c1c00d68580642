//! Ask command handler.

use clap::Args;
use docqa_core::{config::AppConfig, AppError, AppResult};
use docqa_rag::Pipeline;

/// Ask a question grounded in the corpus
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Number of chunks to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Hide the retrieved context in human-readable output
    #[arg(long)]
    pub no_context: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        // Reject blank input up front; the pipeline checks again
        if self.query.trim().is_empty() {
            return Err(AppError::EmptyQuery);
        }

        tracing::info!("Executing ask command");

        let pipeline = Pipeline::from_config(config.clone()).await?;
        let top_k = self.top_k.unwrap_or_else(|| pipeline.default_top_k());

        let answer = pipeline.answer(&self.query, top_k).await?;

        if self.json {
            let output = serde_json::to_value(&answer)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        if !self.no_context {
            println!("Retrieved context:");
            for (i, chunk) in answer.chunks.iter().enumerate() {
                println!();
                println!(
                    "[{}] {} (chunk {}, score {:.3})",
                    i + 1,
                    chunk.source,
                    chunk.position,
                    chunk.score
                );
                println!("{}", chunk.text);
            }
            println!();
        }

        println!("Answer:");
        println!("{}", answer.answer);

        Ok(())
    }
}
