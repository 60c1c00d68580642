//! docqa CLI
//!
//! Command-line shell around the grounded question-answering pipeline.
//! Presents queries and answers; all pipeline semantics live in docqa-rag.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, IndexCommand, StatsCommand};
use docqa_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// docqa - question answering grounded in a document corpus
#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(about = "Ask questions answered strictly from a document corpus", long_about = None)]
#[command(version)]
struct Cli {
    /// Corpus directory (default: ./data)
    #[arg(long, global = true, env = "DOCQA_CORPUS")]
    corpus: Option<PathBuf>,

    /// Index path (default: ./vectorstore/index.sqlite)
    #[arg(long, global = true, env = "DOCQA_INDEX")]
    index: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question grounded in the corpus
    Ask(AskCommand),

    /// Build the vector index (reuses an existing one unless --rebuild)
    Index(IndexCommand),

    /// Show index statistics
    Stats(StatsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Load base configuration from file and environment
    let config = AppConfig::load(cli.config.as_ref())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.corpus,
        cli.index,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::debug!("Corpus: {:?}", config.corpus_dir);
    tracing::debug!("Index: {:?}", config.index_path);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Index(_) => "index",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Index(cmd) => cmd.execute(&config).await,
        Commands::Stats(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
