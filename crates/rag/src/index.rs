//! SQLite-backed vector index.
//!
//! The index is a single database file mapping chunks to their embedding
//! vectors, tagged with a versioned `meta` table so an incompatible or
//! stale build is detectable on load. Lifecycle is load-or-build: an
//! existing file is always reused without touching the embedding service;
//! otherwise all chunks are embedded, written to a temporary sibling file
//! and atomically renamed into place, so a failed build never leaves a
//! half-written index behind.

use crate::embeddings::Embedder;
use crate::types::{Chunk, IndexOrigin, IndexStats, RetrievedChunk};
use chrono::{DateTime, Utc};
use docqa_core::config::EmbeddingSettings;
use docqa_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::path::Path;

/// On-disk schema version; bumped on any incompatible layout change.
const SCHEMA_VERSION: i64 = 1;

/// A queryable vector index over chunks.
pub struct VectorIndex {
    conn: Connection,
    stats: IndexStats,
}

impl VectorIndex {
    /// Load the index at `path`, or build and persist it when absent.
    ///
    /// The load path performs no embedding calls (index reuse invariant).
    /// `chunks` describes the current corpus; on load it is only used to
    /// warn when the persisted index no longer matches the corpus content.
    pub async fn open_or_build(
        path: &Path,
        chunks: &[Chunk],
        embedder: &dyn Embedder,
        settings: &EmbeddingSettings,
    ) -> AppResult<(Self, IndexOrigin)> {
        if path.exists() {
            let index = Self::load(path, settings, chunks)?;
            Ok((index, IndexOrigin::Loaded))
        } else {
            let index = Self::build(path, chunks, embedder, settings).await?;
            Ok((index, IndexOrigin::Built))
        }
    }

    /// Load a persisted index.
    ///
    /// `current_chunks` is the chunking of the present corpus; it is only
    /// compared against the stored digest to warn about staleness.
    pub fn load(
        path: &Path,
        settings: &EmbeddingSettings,
        current_chunks: &[Chunk],
    ) -> AppResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| AppError::IndexLoad(format!("Failed to open {:?}: {}", path, e)))?;

        let stats = read_meta(&conn)?;

        if stats.dimensions != settings.dimensions {
            return Err(AppError::IndexLoad(format!(
                "Index at {:?} was built with {} dimensions but {} are configured; rebuild the index",
                path, stats.dimensions, settings.dimensions
            )));
        }

        if stats.model != settings.model {
            tracing::warn!(
                "Index at {:?} was built with model '{}', configured model is '{}'",
                path,
                stats.model,
                settings.model
            );
        }

        let current_digest = corpus_digest(current_chunks);
        if current_digest != stats.corpus_digest {
            tracing::warn!(
                "Index at {:?} does not match the current corpus content; \
                 it will be reused as-is, rebuild to refresh",
                path
            );
        }

        tracing::info!(
            "Loaded index from {:?} ({} chunks, {} dimensions)",
            path,
            stats.chunk_count,
            stats.dimensions
        );

        Ok(Self { conn, stats })
    }

    /// Embed all chunks, build the index and persist it atomically.
    async fn build(
        path: &Path,
        chunks: &[Chunk],
        embedder: &dyn Embedder,
        settings: &EmbeddingSettings,
    ) -> AppResult<Self> {
        tracing::info!(
            "Building index at {:?} from {} chunks using provider '{}' (model: {})",
            path,
            chunks.len(),
            embedder.provider_name(),
            embedder.model_name()
        );

        // Embed first; a failure here must leave nothing on disk
        let embeddings = embed_chunks(chunks, embedder, settings).await?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "index".to_string());
        let tmp_path = path.with_file_name(format!("{}.tmp", file_name));

        let built_at = Utc::now();
        let digest = corpus_digest(chunks);

        let write_result = write_index(&tmp_path, chunks, &embeddings, settings, &digest, built_at)
            .and_then(|_| {
                std::fs::rename(&tmp_path, path).map_err(|e| {
                    AppError::IndexStorage(format!(
                        "Failed to publish index at {:?}: {}",
                        path, e
                    ))
                })
            });

        if let Err(e) = write_result {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }

        tracing::info!("Persisted index at {:?} ({} chunks)", path, chunks.len());

        // Re-open through the load path so the returned handle is exactly
        // what a future process will see
        Self::load(path, settings, chunks)
    }

    /// Search for the top-k chunks most similar to the query embedding.
    ///
    /// Results are ordered best-first by cosine similarity; ties keep the
    /// original insertion order. Fewer than `top_k` chunks in the index
    /// returns all of them; an empty index returns an empty Vec.
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<RetrievedChunk>> {
        if query_embedding.len() != self.stats.dimensions {
            return Err(AppError::DimensionMismatch {
                expected: self.stats.dimensions,
                actual: query_embedding.len(),
            });
        }

        let mut stmt = self
            .conn
            .prepare("SELECT source, position, text, embedding FROM chunks ORDER BY seq")
            .map_err(|e| AppError::IndexStorage(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                let source: String = row.get(0)?;
                let position: i64 = row.get(1)?;
                let text: String = row.get(2)?;
                let embedding_bytes: Vec<u8> = row.get(3)?;
                Ok((source, position, text, embedding_bytes))
            })
            .map_err(|e| AppError::IndexStorage(format!("Failed to query chunks: {}", e)))?;

        let mut results = Vec::new();
        for row in rows {
            let (source, position, text, embedding_bytes) =
                row.map_err(|e| AppError::IndexStorage(format!("Failed to read chunk: {}", e)))?;
            let embedding = bytes_to_embedding(&embedding_bytes)?;
            let score = cosine_similarity(query_embedding, &embedding);
            results.push(RetrievedChunk {
                source,
                position: position as u32,
                text,
                score,
            });
        }

        // Stable sort: equal scores keep insertion order
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        tracing::debug!("Retrieved {} chunks (requested top-{})", results.len(), top_k);

        Ok(results)
    }

    /// Get metadata describing this index.
    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Number of chunks in the index.
    pub fn len(&self) -> usize {
        self.stats.chunk_count as usize
    }

    /// Whether the index contains no chunks.
    pub fn is_empty(&self) -> bool {
        self.stats.chunk_count == 0
    }
}

/// Embed all chunk texts, batched and order-preserving.
async fn embed_chunks(
    chunks: &[Chunk],
    embedder: &dyn Embedder,
    settings: &EmbeddingSettings,
) -> AppResult<Vec<Vec<f32>>> {
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let batch_size = settings.batch_size.max(1);

    let mut embeddings = Vec::with_capacity(texts.len());
    for batch in texts.chunks(batch_size) {
        let batch_embeddings = embedder.embed_many(batch).await?;

        if batch_embeddings.len() != batch.len() {
            return Err(AppError::EmbeddingService(format!(
                "Embedder returned {} vectors for {} texts",
                batch_embeddings.len(),
                batch.len()
            )));
        }

        for embedding in &batch_embeddings {
            if embedding.len() != settings.dimensions {
                return Err(AppError::EmbeddingService(format!(
                    "Embedder returned {} dimensions, expected {}",
                    embedding.len(),
                    settings.dimensions
                )));
            }
        }

        embeddings.extend(batch_embeddings);
    }

    Ok(embeddings)
}

/// Write chunks, embeddings and meta into a fresh database file.
fn write_index(
    path: &Path,
    chunks: &[Chunk],
    embeddings: &[Vec<f32>],
    settings: &EmbeddingSettings,
    corpus_digest: &str,
    built_at: DateTime<Utc>,
) -> AppResult<()> {
    let mut conn = Connection::open(path)
        .map_err(|e| AppError::IndexStorage(format!("Failed to create {:?}: {}", path, e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE chunks (
            seq INTEGER PRIMARY KEY,
            source TEXT NOT NULL,
            position INTEGER NOT NULL,
            offset INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL
        );
        "#,
    )
    .map_err(|e| AppError::IndexStorage(format!("Failed to create tables: {}", e)))?;

    let tx = conn
        .transaction()
        .map_err(|e| AppError::IndexStorage(format!("Failed to start transaction: {}", e)))?;

    let meta = [
        ("schema_version", SCHEMA_VERSION.to_string()),
        ("dimensions", settings.dimensions.to_string()),
        ("model", settings.model.clone()),
        ("built_at", built_at.to_rfc3339()),
        ("corpus_digest", corpus_digest.to_string()),
    ];

    for (key, value) in &meta {
        tx.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .map_err(|e| AppError::IndexStorage(format!("Failed to write meta: {}", e)))?;
    }

    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO chunks (seq, source, position, offset, text, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(|e| AppError::IndexStorage(format!("Failed to prepare insert: {}", e)))?;

        for (seq, (chunk, embedding)) in chunks.iter().zip(embeddings).enumerate() {
            stmt.execute(params![
                seq as i64,
                chunk.source,
                chunk.position as i64,
                chunk.offset as i64,
                chunk.text,
                embedding_to_bytes(embedding),
            ])
            .map_err(|e| AppError::IndexStorage(format!("Failed to insert chunk: {}", e)))?;
        }
    }

    tx.commit()
        .map_err(|e| AppError::IndexStorage(format!("Failed to commit: {}", e)))?;

    Ok(())
}

/// Read and validate the meta table of a persisted index.
fn read_meta(conn: &Connection) -> AppResult<IndexStats> {
    let get = |key: &str| -> AppResult<String> {
        conn.query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| {
            row.get::<_, String>(0)
        })
        .map_err(|e| {
            AppError::IndexLoad(format!(
                "Missing or unreadable meta entry '{}': {}",
                key, e
            ))
        })
    };

    let schema_version: i64 = get("schema_version")?
        .parse()
        .map_err(|e| AppError::IndexLoad(format!("Invalid schema version: {}", e)))?;

    if schema_version != SCHEMA_VERSION {
        return Err(AppError::IndexLoad(format!(
            "Unsupported index schema version {} (expected {}); rebuild the index",
            schema_version, SCHEMA_VERSION
        )));
    }

    let dimensions: usize = get("dimensions")?
        .parse()
        .map_err(|e| AppError::IndexLoad(format!("Invalid dimensions: {}", e)))?;

    let model = get("model")?;

    let built_at = DateTime::parse_from_rfc3339(&get("built_at")?)
        .map_err(|e| AppError::IndexLoad(format!("Invalid build timestamp: {}", e)))?
        .with_timezone(&Utc);

    let corpus_digest = get("corpus_digest")?;

    let chunk_count: u32 = conn
        .query_row("SELECT COUNT(*) FROM chunks", [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::IndexLoad(format!("Failed to count chunks: {}", e)))?;

    Ok(IndexStats {
        dimensions,
        model,
        chunk_count,
        built_at,
        corpus_digest,
    })
}

/// Digest of the chunked corpus content, for staleness detection.
pub fn corpus_digest(chunks: &[Chunk]) -> String {
    let mut hasher = Sha256::new();
    for chunk in chunks {
        hasher.update(chunk.source.as_bytes());
        hasher.update([0u8]);
        hasher.update(chunk.text.as_bytes());
        hasher.update([0u8]);
    }

    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Convert an embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert stored bytes back to an embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::IndexLoad(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        embedding.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(embedding)
}

/// Cosine similarity between two vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
