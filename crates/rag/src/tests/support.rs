//! Shared test doubles for the embedding and generation boundaries.

use crate::embeddings::providers::trigram::TrigramEmbedder;
use crate::embeddings::Embedder;
use docqa_core::{AppError, AppResult};
use docqa_llm::{GenerationRequest, GenerationResponse, GenerationUsage, Generator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Deterministic embedder that counts service calls.
///
/// Wraps the trigram embedder so retrieval behaves realistically while
/// tests assert on how often the embedding service was touched.
#[derive(Debug)]
pub struct CountingEmbedder {
    inner: TrigramEmbedder,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            inner: TrigramEmbedder::new(dimensions),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of embed_many invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Embedder for CountingEmbedder {
    fn provider_name(&self) -> &str {
        "counting"
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed_many(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_many(texts).await
    }
}

/// Embedder that returns predefined vectors, in order of the texts given.
#[derive(Debug)]
pub struct StaticEmbedder {
    vectors: Vec<Vec<f32>>,
}

impl StaticEmbedder {
    pub fn new(vectors: Vec<Vec<f32>>) -> Self {
        Self { vectors }
    }
}

#[async_trait::async_trait]
impl Embedder for StaticEmbedder {
    fn provider_name(&self) -> &str {
        "static"
    }

    fn model_name(&self) -> &str {
        "static-v1"
    }

    fn dimensions(&self) -> usize {
        self.vectors.first().map(|v| v.len()).unwrap_or(0)
    }

    async fn embed_many(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.len() > self.vectors.len() {
            return Err(AppError::EmbeddingService(format!(
                "StaticEmbedder holds {} vectors, {} requested",
                self.vectors.len(),
                texts.len()
            )));
        }

        Ok(self.vectors[..texts.len()].to_vec())
    }
}

/// Embedder whose every call fails, for build-failure tests.
#[derive(Debug)]
pub struct FailingEmbedder {
    dimensions: usize,
}

impl FailingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait::async_trait]
impl Embedder for FailingEmbedder {
    fn provider_name(&self) -> &str {
        "failing"
    }

    fn model_name(&self) -> &str {
        "failing-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_many(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Err(AppError::EmbeddingService(
            "embedding service unavailable".to_string(),
        ))
    }
}

/// Generator that records every request and replies with a canned answer.
pub struct RecordingGenerator {
    reply: String,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl RecordingGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Prompts of all requests seen so far.
    pub fn prompts(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.prompt).collect()
    }

    /// Number of generation calls so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Generator for RecordingGenerator {
    fn provider_name(&self) -> &str {
        "recording"
    }

    async fn generate(&self, request: &GenerationRequest) -> AppResult<GenerationResponse> {
        self.requests.lock().unwrap().push(request.clone());

        Ok(GenerationResponse {
            content: self.reply.clone(),
            model: request.model.clone(),
            usage: GenerationUsage::default(),
        })
    }
}

/// Generator whose every call fails, counting invocations.
pub struct FailingGenerator {
    calls: AtomicUsize,
}

impl FailingGenerator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Generator for FailingGenerator {
    fn provider_name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _request: &GenerationRequest) -> AppResult<GenerationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::GenerationService(
            "generation service unavailable".to_string(),
        ))
    }
}
