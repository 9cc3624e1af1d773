//! SQLite-backed [`VectorIndex`].
//!
//! Chunks live in `doc_chunks` and their embeddings in `chunk_vectors` as
//! little-endian `f32` BLOBs. A search embeds the query and scores every
//! stored vector by cosine similarity (brute force; the catalog's document
//! set is small). Ties are broken by ascending chunk id so results are
//! deterministic.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use toba_chat_core::embedding::{blob_to_vec, cosine_similarity, QueryEmbedder};
use toba_chat_core::index::VectorIndex;
use toba_chat_core::models::DocumentChunk;

pub struct SqliteVectorIndex {
    pool: SqlitePool,
    embedder: Arc<dyn QueryEmbedder>,
}

impl SqliteVectorIndex {
    pub fn new(pool: SqlitePool, embedder: Arc<dyn QueryEmbedder>) -> Self {
        Self { pool, embedder }
    }

    /// Number of chunks that have a stored vector.
    pub async fn vector_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunk_vectors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<DocumentChunk>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = self
            .embedder
            .embed_query(query)
            .await
            .with_context(|| format!("embedding query with {}", self.embedder.model_name()))?;

        let rows = sqlx::query(
            "SELECT c.id, c.source_id, c.text, v.embedding \
             FROM chunk_vectors v JOIN doc_chunks c ON c.id = v.chunk_id",
        )
        .fetch_all(&self.pool)
        .await
        .context("loading chunk vectors")?;

        let mut scored = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: i64 = row.try_get("id")?;
            let blob: Vec<u8> = row.try_get("embedding")?;
            let score = cosine_similarity(&query_vec, &blob_to_vec(&blob));
            scored.push((score, id, row));
        }

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        scored
            .into_iter()
            .take(k)
            .map(|(_, _, row)| -> Result<DocumentChunk> {
                Ok(DocumentChunk {
                    text: row.try_get("text")?,
                    source_id: row.try_get("source_id")?,
                })
            })
            .collect()
    }
}
