//! In-memory [`VectorIndex`] for tests and offline demos.
//!
//! Scores chunks by term overlap with the query instead of embeddings, so
//! results are deterministic without a model. Ties keep insertion order.

use std::sync::{PoisonError, RwLock};

use anyhow::Result;
use async_trait::async_trait;

use crate::models::DocumentChunk;

use super::VectorIndex;

#[derive(Default)]
pub struct InMemoryIndex {
    chunks: RwLock<Vec<DocumentChunk>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_chunks(chunks: Vec<DocumentChunk>) -> Self {
        Self {
            chunks: RwLock::new(chunks),
        }
    }

    pub fn insert(&self, chunk: DocumentChunk) {
        self.chunks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(chunk);
    }
}

fn terms(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<DocumentChunk>> {
        let query_terms = terms(query);
        if query_terms.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let chunks = self.chunks.read().unwrap_or_else(PoisonError::into_inner);
        let mut scored: Vec<(usize, &DocumentChunk)> = chunks
            .iter()
            .filter_map(|chunk| {
                let text = chunk.text.to_lowercase();
                let hits = query_terms.iter().filter(|t| text.contains(t.as_str())).count();
                (hits > 0).then_some((hits, chunk))
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, chunk)| chunk.clone())
            .collect())
    }
}
