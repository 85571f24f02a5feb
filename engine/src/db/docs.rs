//! Vector store: the `strategic_docs` table
//!
//! Chunks carry their embedding as a little-endian f32 blob plus a JSON
//! metadata column. Similarity search decodes every stored vector and ranks
//! by cosine similarity in memory, which is the right trade for a corpus of
//! strategy documents measured in hundreds of chunks. The metric must match
//! what was used at index time; both paths here are cosine.
//!
//! Every stored vector is validated against the configured dimensionality.
//! A mismatch means ingestion and query configuration have diverged — a
//! configuration fault, not a recoverable per-query condition.

use chrono::Utc;
use sdk::errors::EngineError;
use sdk::types::RetrievedChunk;
use sqlx::{Row, SqlitePool};

/// Read-mostly access to the vector store
#[derive(Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
    dimension: usize,
}

impl DocumentStore {
    /// Create a new store handle over a shared pool.
    ///
    /// `dimension` is the configured embedding dimensionality — the single
    /// source of truth both ingestion and search validate against.
    pub fn new(pool: SqlitePool, dimension: usize) -> Self {
        Self { pool, dimension }
    }

    /// Index one chunk. Used only by the ingestion collaborator.
    pub async fn insert_chunk(
        &self,
        text: &str,
        embedding: &[f32],
        metadata: serde_json::Value,
    ) -> Result<(), EngineError> {
        if embedding.len() != self.dimension {
            return Err(EngineError::Config(format!(
                "Chunk embedding has {} components, store is configured for {}",
                embedding.len(),
                self.dimension
            )));
        }

        let mut metadata = metadata;
        if let Some(object) = metadata.as_object_mut() {
            object.insert(
                "indexed_at".to_string(),
                serde_json::Value::String(Utc::now().to_rfc3339()),
            );
        }

        sqlx::query("INSERT INTO strategic_docs (text, embedding, metadata) VALUES (?, ?, ?)")
            .bind(text)
            .bind(encode_embedding(embedding))
            .bind(metadata.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| EngineError::StoreUnavailable(format!("Chunk insert failed: {}", e)))?;

        Ok(())
    }

    /// Retrieve the top-k chunks nearest to `query` by cosine similarity.
    ///
    /// Chunks scoring below `similarity_floor` (when configured) are
    /// dropped. An empty store yields an empty result, not an error.
    pub async fn search(
        &self,
        query: &[f32],
        top_k: usize,
        similarity_floor: Option<f32>,
    ) -> Result<Vec<RetrievedChunk>, EngineError> {
        if query.len() != self.dimension {
            return Err(EngineError::Config(format!(
                "Query embedding has {} components, store is configured for {}",
                query.len(),
                self.dimension
            )));
        }

        let rows = sqlx::query("SELECT text, embedding, metadata FROM strategic_docs")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EngineError::StoreUnavailable(format!("Chunk scan failed: {}", e)))?;

        let mut scored = Vec::with_capacity(rows.len());
        for row in &rows {
            let text: String = row
                .try_get("text")
                .map_err(|e| EngineError::StoreUnavailable(e.to_string()))?;
            let blob: Vec<u8> = row
                .try_get("embedding")
                .map_err(|e| EngineError::StoreUnavailable(e.to_string()))?;
            let metadata_raw: String = row
                .try_get("metadata")
                .map_err(|e| EngineError::StoreUnavailable(e.to_string()))?;

            let embedding = decode_embedding(&blob)?;
            if embedding.len() != self.dimension {
                return Err(EngineError::Config(format!(
                    "Stored chunk has {} embedding components, store is configured for {}; \
                     re-index with a consistent dimensionality",
                    embedding.len(),
                    self.dimension
                )));
            }

            let metadata = serde_json::from_str(&metadata_raw)
                .unwrap_or(serde_json::Value::Null);

            scored.push(RetrievedChunk {
                score: cosine_similarity(query, &embedding),
                text,
                metadata,
            });
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        if let Some(floor) = similarity_floor {
            scored.retain(|chunk| chunk.score >= floor);
        }

        Ok(scored)
    }

    /// Count all indexed chunks. Used by diagnostics.
    pub async fn count(&self) -> Result<i64, EngineError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM strategic_docs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| EngineError::StoreUnavailable(e.to_string()))
    }
}

/// Encode an embedding as a little-endian f32 blob
pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for component in vector {
        bytes.extend_from_slice(&component.to_le_bytes());
    }
    bytes
}

/// Decode a little-endian f32 blob back into an embedding
pub fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>, EngineError> {
    if bytes.len() % 4 != 0 {
        return Err(EngineError::StoreUnavailable(format!(
            "Corrupt embedding blob: {} bytes is not a whole number of f32s",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Cosine similarity between two equal-length vectors.
///
/// A zero-magnitude vector scores 0.0 against everything.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_embedding_blob_roundtrip() {
        let vector = vec![0.25_f32, -1.5, 3.75];
        let decoded = decode_embedding(&encode_embedding(&vector)).unwrap();
        assert_eq!(decoded, vector);
    }

    #[test]
    fn test_decode_rejects_ragged_blob() {
        let err = decode_embedding(&[0u8, 1, 2]).unwrap_err();
        assert!(matches!(err, EngineError::StoreUnavailable(_)));
    }

    #[test]
    fn test_cosine_similarity_identity() {
        let v = vec![0.6_f32, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0_f32, 0.0];
        let b = vec![0.0_f32, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = vec![0.0_f32, 0.0];
        let b = vec![1.0_f32, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    async fn store_with_dim(dimension: usize) -> (TempDir, DocumentStore) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(&temp_dir.path().join("test.db")).await.unwrap();
        let store = DocumentStore::new(db.pool().clone(), dimension);
        (temp_dir, store)
    }

    #[tokio::test]
    async fn test_search_ranks_by_similarity() {
        let (_guard, store) = store_with_dim(2).await;

        store
            .insert_chunk("about cloud", &[1.0, 0.0], json!({}))
            .await
            .unwrap();
        store
            .insert_chunk("about marketing", &[0.0, 1.0], json!({}))
            .await
            .unwrap();

        let hits = store.search(&[0.9, 0.1], 2, None).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "about cloud");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_search_truncates_to_top_k() {
        let (_guard, store) = store_with_dim(2).await;

        for i in 0..5 {
            store
                .insert_chunk(&format!("chunk {}", i), &[1.0, i as f32], json!({}))
                .await
                .unwrap();
        }

        let hits = store.search(&[1.0, 0.0], 3, None).await.unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn test_search_applies_floor() {
        let (_guard, store) = store_with_dim(2).await;

        store
            .insert_chunk("aligned", &[1.0, 0.0], json!({}))
            .await
            .unwrap();
        store
            .insert_chunk("orthogonal", &[0.0, 1.0], json!({}))
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.0], 5, Some(0.5)).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "aligned");
    }

    #[tokio::test]
    async fn test_empty_store_returns_no_hits() {
        let (_guard, store) = store_with_dim(2).await;

        let hits = store.search(&[1.0, 0.0], 3, None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_insert_rejects_wrong_dimension() {
        let (_guard, store) = store_with_dim(3).await;

        let err = store
            .insert_chunk("bad", &[1.0, 0.0], json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Config(_)));
    }

    #[tokio::test]
    async fn test_stored_dimension_mismatch_is_config_fault() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(&temp_dir.path().join("test.db")).await.unwrap();

        // Indexed at dimension 2, queried at dimension 3: the inconsistent
        // configuration the single-source-of-truth rule exists to catch.
        let writer = DocumentStore::new(db.pool().clone(), 2);
        writer
            .insert_chunk("legacy chunk", &[1.0, 0.0], json!({}))
            .await
            .unwrap();

        let reader = DocumentStore::new(db.pool().clone(), 3);
        let err = reader.search(&[1.0, 0.0, 0.0], 3, None).await.unwrap_err();

        assert!(matches!(err, EngineError::Config(_)));
    }

    #[tokio::test]
    async fn test_metadata_stamped_at_index_time() {
        let (_guard, store) = store_with_dim(2).await;

        store
            .insert_chunk("stamped", &[1.0, 0.0], json!({"source": "seed"}))
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.0], 1, None).await.unwrap();
        assert_eq!(hits[0].metadata["source"], "seed");
        assert!(hits[0].metadata["indexed_at"].is_string());
    }
}
