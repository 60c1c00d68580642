//! Configuration management for the docqa pipeline.
//!
//! Configuration is merged from multiple sources, lowest precedence first:
//! - Built-in defaults
//! - A YAML config file (`docqa.yaml` in the working directory by default)
//! - `DOCQA_*` environment variables
//! - Command-line flags (applied via `with_overrides`)
//!
//! The result is loaded once at process start, immutable thereafter, and
//! injected into each component. Business logic never reads the ambient
//! environment directly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default config file name, resolved relative to the working directory.
const DEFAULT_CONFIG_FILE: &str = "docqa.yaml";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory containing the corpus documents
    pub corpus_dir: PathBuf,

    /// Path of the persisted vector index
    pub index_path: PathBuf,

    /// Maximum chunk length in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,

    /// Default number of chunks to retrieve per query
    pub top_k: usize,

    /// Embedding service settings
    pub embedding: EmbeddingSettings,

    /// Generation service settings
    pub generation: GenerationSettings,

    /// Optional custom prompt template file
    pub prompt_template: Option<PathBuf>,

    /// Log level override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,
}

/// Settings for the embedding service boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider name: "ollama" or "trigram"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensionality
    pub dimensions: usize,

    /// Provider endpoint (HTTP providers only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Maximum batch size for embedding requests
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Settings for the generation service boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Provider name: "ollama" (hosted providers reserved)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Provider endpoint (HTTP providers only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key, for providers that need one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Sampling temperature; low by default for factual answering
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_batch_size() -> usize {
    32
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    1024
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            endpoint: None,
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            endpoint: None,
            api_key_env: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("data"),
            index_path: PathBuf::from("vectorstore/index.sqlite"),
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 3,
            embedding: EmbeddingSettings::default(),
            generation: GenerationSettings::default(),
            prompt_template: None,
            log_level: None,
            no_color: false,
        }
    }
}

/// Partial structure of the YAML config file; every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    corpus_dir: Option<PathBuf>,
    index_path: Option<PathBuf>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    top_k: Option<usize>,
    embedding: Option<EmbeddingSettings>,
    generation: Option<GenerationSettings>,
    prompt_template: Option<PathBuf>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `DOCQA_CONFIG`: path to the config file
    /// - `DOCQA_CORPUS`: corpus directory
    /// - `DOCQA_INDEX`: index path
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    pub fn load(config_file: Option<&PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let config_path = config_file
            .cloned()
            .or_else(|| std::env::var("DOCQA_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if config_path.exists() {
            config.merge_yaml(&config_path)?;
        } else if config_file.is_some() {
            // An explicitly named file must exist; the default may be absent.
            return Err(AppError::Config(format!(
                "Config file does not exist: {}",
                config_path.display()
            )));
        }

        // Environment variables override the file
        if let Ok(corpus) = std::env::var("DOCQA_CORPUS") {
            config.corpus_dir = PathBuf::from(corpus);
        }

        if let Ok(index) = std::env::var("DOCQA_INDEX") {
            config.index_path = PathBuf::from(index);
        }

        config.log_level = std::env::var("RUST_LOG").ok().or(config.log_level);

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(corpus_dir) = file.corpus_dir {
            self.corpus_dir = corpus_dir;
        }
        if let Some(index_path) = file.index_path {
            self.index_path = index_path;
        }
        if let Some(chunk_size) = file.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(chunk_overlap) = file.chunk_overlap {
            self.chunk_overlap = chunk_overlap;
        }
        if let Some(top_k) = file.top_k {
            self.top_k = top_k;
        }
        if let Some(embedding) = file.embedding {
            self.embedding = embedding;
        }
        if let Some(generation) = file.generation {
            self.generation = generation;
        }
        if let Some(prompt_template) = file.prompt_template {
            self.prompt_template = Some(prompt_template);
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        Ok(())
    }

    /// Apply CLI overrides, taking precedence over file and environment.
    pub fn with_overrides(
        mut self,
        corpus_dir: Option<PathBuf>,
        index_path: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(corpus_dir) = corpus_dir {
            self.corpus_dir = corpus_dir;
        }

        if let Some(index_path) = index_path {
            self.index_path = index_path;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose && self.log_level.is_none() {
            self.log_level = Some("debug".to_string());
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolve the generation API key from the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.generation
            .api_key_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
    }

    /// Validate configuration before the pipeline is constructed.
    pub fn validate(&self) -> AppResult<()> {
        let known_embedders = ["ollama", "trigram"];
        if !known_embedders.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                known_embedders.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be positive".to_string(),
            ));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::InvalidChunkConfig(format!(
                "overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be positive".to_string()));
        }

        Ok(())
    }
}
