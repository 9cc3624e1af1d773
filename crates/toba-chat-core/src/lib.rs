//! # toba-chat core
//!
//! Runtime-free logic for the toba-chat customer-support assistant: the
//! catalog data model, the [`catalog::CatalogStore`] and
//! [`index::VectorIndex`] contracts, intent classification, and context
//! retrieval.
//!
//! This crate has no tokio, sqlx, or HTTP dependencies. The `toba-chat`
//! app crate supplies the SQLite catalog, the embedding-backed index and
//! the Ollama language-model client, and wires them into a request
//! pipeline.
//!
//! ```text
//! user text ──▶ IntentClassifier ──▶ Intent ──▶ ContextRetriever ──▶ context
//!                (LLM + keywords)               (catalog + index)
//! ```

pub mod catalog;
pub mod classify;
pub mod context;
pub mod embedding;
pub mod index;
pub mod intent;
pub mod llm;
pub mod models;
pub mod retrieve;
