//! End-to-end pipeline scenarios with stubbed service providers.

use crate::tests::support::{CountingEmbedder, RecordingGenerator};
use crate::types::IndexOrigin;
use crate::Pipeline;
use docqa_core::config::EmbeddingSettings;
use docqa_core::{AppConfig, AppError};
use docqa_prompt::REFUSAL_SENTENCE;
use std::sync::Arc;
use tempfile::TempDir;

/// Build a config rooted in a temp dir, with an empty corpus directory.
fn test_config(temp: &TempDir) -> AppConfig {
    let corpus_dir = temp.path().join("corpus");
    std::fs::create_dir_all(&corpus_dir).unwrap();

    AppConfig {
        corpus_dir,
        index_path: temp.path().join("vectorstore").join("index.sqlite"),
        chunk_size: 500,
        chunk_overlap: 50,
        top_k: 3,
        embedding: EmbeddingSettings {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 128,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn write_doc(config: &AppConfig, name: &str, text: &str) {
    std::fs::write(config.corpus_dir.join(name), text).unwrap();
}

async fn open_pipeline(
    config: AppConfig,
    embedder: Arc<CountingEmbedder>,
    generator: Arc<RecordingGenerator>,
) -> Pipeline {
    Pipeline::open(config, embedder, generator).await.unwrap()
}

#[tokio::test]
async fn test_answer_grounded_in_relevant_document() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    write_doc(&config, "delays.md", "Delays are caused by weather and permitting.");
    write_doc(&config, "safety.md", "Hard hats must be worn on site at all times.");

    let embedder = Arc::new(CountingEmbedder::new(128));
    let generator = Arc::new(RecordingGenerator::new(
        "Construction delays are caused by weather and permitting.",
    ));
    let pipeline = open_pipeline(config, embedder, generator.clone()).await;

    let answer = pipeline
        .answer("What causes construction delays?", 1)
        .await
        .unwrap();

    assert_eq!(answer.chunks.len(), 1);
    assert!(answer.chunks[0].text.contains("weather and permitting"));
    assert!(!answer.answer.is_empty());
    assert_ne!(answer.answer, REFUSAL_SENTENCE);

    // The generation service saw the retrieved context and the refusal rule
    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("weather and permitting"));
    assert!(prompts[0].contains("What causes construction delays?"));
    assert!(prompts[0].contains(REFUSAL_SENTENCE));
}

#[tokio::test]
async fn test_empty_corpus_pipeline_is_usable_but_retrieves_nothing() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);

    let embedder = Arc::new(CountingEmbedder::new(128));
    let generator = Arc::new(RecordingGenerator::new(REFUSAL_SENTENCE));
    let pipeline = open_pipeline(config.clone(), embedder.clone(), generator.clone()).await;

    assert_eq!(pipeline.origin(), IndexOrigin::Built);
    assert_eq!(pipeline.index_stats().chunk_count, 0);
    assert!(config.index_path.exists());

    let answer = pipeline.answer("anything at all", 3).await.unwrap();

    assert!(answer.chunks.is_empty());
    assert_eq!(answer.context, "");
    assert_eq!(answer.answer, REFUSAL_SENTENCE);

    // Prompt stays well-formed with an empty context
    let prompts = generator.prompts();
    assert!(prompts[0].contains("CONTEXT:"));
    assert!(prompts[0].contains("anything at all"));
}

#[tokio::test]
async fn test_empty_query_fails_before_any_service_call() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    write_doc(&config, "doc.md", "Some content.");

    let embedder = Arc::new(CountingEmbedder::new(128));
    let generator = Arc::new(RecordingGenerator::new("unused"));
    let pipeline = open_pipeline(config, embedder.clone(), generator.clone()).await;

    let build_calls = embedder.calls();

    let result = pipeline.answer("   ", 3).await;

    assert!(matches!(result, Err(AppError::EmptyQuery)));
    assert_eq!(embedder.calls(), build_calls);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_persisted_index_is_reused_without_embedding() {
    let temp = TempDir::new().unwrap();
    let config = test_config(&temp);
    write_doc(&config, "doc.md", "Delays are caused by weather and permitting.");

    let first_embedder = Arc::new(CountingEmbedder::new(128));
    let generator = Arc::new(RecordingGenerator::new("ok"));
    let pipeline =
        open_pipeline(config.clone(), first_embedder.clone(), generator.clone()).await;

    assert_eq!(pipeline.origin(), IndexOrigin::Built);
    assert!(first_embedder.calls() > 0);

    let first_ranking: Vec<String> = pipeline
        .answer("what delays projects", 3)
        .await
        .unwrap()
        .chunks
        .into_iter()
        .map(|c| c.text)
        .collect();
    drop(pipeline);

    let second_embedder = Arc::new(CountingEmbedder::new(128));
    let pipeline = open_pipeline(config, second_embedder.clone(), generator).await;

    assert_eq!(pipeline.origin(), IndexOrigin::Loaded);
    assert_eq!(second_embedder.calls(), 0, "reuse must not re-embed the corpus");

    let second_ranking: Vec<String> = pipeline
        .answer("what delays projects", 3)
        .await
        .unwrap()
        .chunks
        .into_iter()
        .map(|c| c.text)
        .collect();

    assert_eq!(first_ranking, second_ranking);
}

#[tokio::test]
async fn test_missing_corpus_dir_fails() {
    let temp = TempDir::new().unwrap();
    let mut config = test_config(&temp);
    config.corpus_dir = temp.path().join("no-such-dir");

    let embedder = Arc::new(CountingEmbedder::new(128));
    let generator = Arc::new(RecordingGenerator::new("unused"));

    let result = Pipeline::open(config, embedder, generator).await;
    assert!(matches!(result, Err(AppError::CorpusNotFound(_))));
}

#[tokio::test]
async fn test_invalid_chunk_config_fails() {
    let temp = TempDir::new().unwrap();
    let mut config = test_config(&temp);
    config.chunk_overlap = config.chunk_size;

    let embedder = Arc::new(CountingEmbedder::new(128));
    let generator = Arc::new(RecordingGenerator::new("unused"));

    let result = Pipeline::open(config, embedder, generator).await;
    assert!(matches!(result, Err(AppError::InvalidChunkConfig(_))));
}

#[tokio::test]
async fn test_custom_prompt_template_is_used() {
    let temp = TempDir::new().unwrap();
    let mut config = test_config(&temp);
    write_doc(&config, "doc.md", "Cranes lift heavy loads.");

    let template_path = temp.path().join("template.txt");
    std::fs::write(
        &template_path,
        "CUSTOM HEADER\nContext: {{context}}\nQuestion: {{question}}\n",
    )
    .unwrap();
    config.prompt_template = Some(template_path);

    let embedder = Arc::new(CountingEmbedder::new(128));
    let generator = Arc::new(RecordingGenerator::new("ok"));
    let pipeline = open_pipeline(config, embedder, generator.clone()).await;

    pipeline.answer("What do cranes do?", 1).await.unwrap();

    let prompts = generator.prompts();
    assert!(prompts[0].starts_with("CUSTOM HEADER"));
    assert!(prompts[0].contains("Cranes lift heavy loads."));
}
