//! Query-time retrieval.
//!
//! Embeds a query with the same embedder used at build time and returns
//! the top-k most similar chunks from the index.

use crate::embeddings::Embedder;
use crate::index::VectorIndex;
use crate::types::RetrievedChunk;
use docqa_core::{AppError, AppResult};

/// Retrieve the `top_k` chunks most similar to `query`, best-first.
///
/// An empty or whitespace-only query is rejected before any service call.
/// An empty index short-circuits to an empty result without embedding the
/// query. Dimensionality skew between the query embedding and the index
/// surfaces as `AppError::DimensionMismatch`.
pub async fn retrieve(
    index: &VectorIndex,
    embedder: &dyn Embedder,
    query: &str,
    top_k: usize,
) -> AppResult<Vec<RetrievedChunk>> {
    if query.trim().is_empty() {
        return Err(AppError::EmptyQuery);
    }

    if index.is_empty() {
        tracing::debug!("Index is empty, returning no chunks");
        return Ok(Vec::new());
    }

    let query_embedding = embedder.embed(query).await?;
    let results = index.search(&query_embedding, top_k)?;

    if let Some(best) = results.first() {
        tracing::info!(
            "Retrieved {} chunks (top score: {:.3})",
            results.len(),
            best.score
        );
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::VectorIndex;
    use crate::tests::support::{CountingEmbedder, StaticEmbedder};
    use crate::types::Chunk;
    use docqa_core::config::EmbeddingSettings;
    use tempfile::TempDir;

    fn settings(dimensions: usize) -> EmbeddingSettings {
        EmbeddingSettings {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions,
            ..Default::default()
        }
    }

    fn chunk(text: &str, position: u32) -> Chunk {
        Chunk {
            source: "doc.md".to_string(),
            position,
            offset: 0,
            text: text.to_string(),
        }
    }

    async fn build_index(
        dir: &TempDir,
        chunks: &[Chunk],
        embedder: &dyn crate::embeddings::Embedder,
        dimensions: usize,
    ) -> VectorIndex {
        let path = dir.path().join("index.sqlite");
        let (index, _) = VectorIndex::open_or_build(&path, chunks, embedder, &settings(dimensions))
            .await
            .unwrap();
        index
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_embedding() {
        let temp = TempDir::new().unwrap();
        let embedder = CountingEmbedder::new(16);
        let index = build_index(&temp, &[chunk("content", 0)], &embedder, 16).await;

        let build_calls = embedder.calls();
        let result = retrieve(&index, &embedder, "   ", 3).await;

        assert!(matches!(result, Err(AppError::EmptyQuery)));
        assert_eq!(embedder.calls(), build_calls, "no embedding call for an empty query");
    }

    #[tokio::test]
    async fn test_ordering_best_first() {
        let temp = TempDir::new().unwrap();
        let embedder = CountingEmbedder::new(64);
        let chunks = vec![
            chunk("delays are caused by weather and permitting", 0),
            chunk("concrete curing takes several days", 1),
        ];
        let index = build_index(&temp, &chunks, &embedder, 64).await;

        let results = retrieve(&index, &embedder, "weather and permitting delays", 2)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].text.contains("weather and permitting"));
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_k_larger_than_index_returns_all() {
        let temp = TempDir::new().unwrap();
        let embedder = CountingEmbedder::new(32);
        let chunks = vec![chunk("alpha text", 0), chunk("beta text", 1)];
        let index = build_index(&temp, &chunks, &embedder, 32).await;

        let results = retrieve(&index, &embedder, "alpha", 10).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_index_returns_empty_without_embedding() {
        let temp = TempDir::new().unwrap();
        let embedder = CountingEmbedder::new(32);
        let index = build_index(&temp, &[], &embedder, 32).await;

        let build_calls = embedder.calls();
        let results = retrieve(&index, &embedder, "anything", 3).await.unwrap();

        assert!(results.is_empty());
        assert_eq!(embedder.calls(), build_calls);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_surfaces() {
        let temp = TempDir::new().unwrap();
        let build_embedder = StaticEmbedder::new(vec![vec![1.0, 0.0, 0.0]]);
        let index = build_index(&temp, &[chunk("text", 0)], &build_embedder, 3).await;

        // A query embedder with different output dimensionality
        let query_embedder = CountingEmbedder::new(5);
        let result = retrieve(&index, &query_embedder, "text", 1).await;

        assert!(matches!(result, Err(AppError::DimensionMismatch { .. })));
    }
}
