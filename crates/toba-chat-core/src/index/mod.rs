//! Vector index abstraction.
//!
//! The document index is built by an external batch job; this system only
//! queries it. A deployment may run without an index at all, which callers
//! model as `Option<Arc<dyn VectorIndex>>`.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::DocumentChunk;

/// Top-k similarity search over document chunks.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return at most `k` chunks, most similar first.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<DocumentChunk>>;
}
