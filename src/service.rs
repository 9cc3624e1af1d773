//! Application wiring.
//!
//! [`ChatService::open`] builds every component once from the
//! configuration: the SQLite pool, catalog, optional vector index, Ollama
//! client, retriever and generator. Callers share the service behind an
//! `Arc` and call [`ChatService::close`] on shutdown.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;

use toba_chat_core::index::VectorIndex;
use toba_chat_core::llm::LanguageModel;
use toba_chat_core::retrieve::ContextRetriever;

use crate::catalog::SqliteCatalog;
use crate::config::Config;
use crate::db;
use crate::embedding::create_embedder;
use crate::generator::{Exchange, ResponseGenerator};
use crate::llm::OllamaClient;
use crate::migrate::migrate_pool;
use crate::vector_index::SqliteVectorIndex;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    pub response: String,
}

pub struct ChatService {
    generator: Arc<ResponseGenerator>,
    business_name: String,
    pool: Option<SqlitePool>,
}

impl ChatService {
    pub async fn open(config: &Config) -> Result<Self> {
        let model: Arc<dyn LanguageModel> =
            Arc::new(OllamaClient::new(&config.llm, &config.messages)?);
        Self::open_with_model(config, model).await
    }

    /// Like [`open`](ChatService::open) with a caller-supplied language model.
    pub async fn open_with_model(config: &Config, model: Arc<dyn LanguageModel>) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate_pool(&pool).await?;

        let index: Option<Arc<dyn VectorIndex>> = match create_embedder(&config.embedding)? {
            Some(embedder) => {
                let index = SqliteVectorIndex::new(pool.clone(), embedder);
                match index.vector_count().await {
                    Ok(0) => tracing::warn!("vector index is empty; document retrieval will return nothing"),
                    Ok(n) => tracing::info!(vectors = n, "vector index ready"),
                    Err(e) => tracing::warn!(error = %e, "could not inspect vector index"),
                }
                Some(Arc::new(index))
            }
            None => {
                tracing::warn!("embeddings disabled; running without a vector index");
                None
            }
        };

        let retriever = ContextRetriever::new(
            Arc::new(SqliteCatalog::new(pool.clone())),
            index,
            config.retrieval.params(),
        );
        let generator = ResponseGenerator::new(model, retriever, config.business.name.clone())
            .with_internal_apology(config.messages.internal_apology.clone());

        tracing::info!(
            db = %config.db.path.display(),
            model = %config.llm.model,
            "chat service ready"
        );

        Ok(Self {
            generator: Arc::new(generator),
            business_name: config.business.name.clone(),
            pool: Some(pool),
        })
    }

    /// A service around an existing generator, with no pool to close.
    pub fn from_generator(generator: ResponseGenerator, business_name: impl Into<String>) -> Self {
        Self {
            generator: Arc::new(generator),
            business_name: business_name.into(),
            pool: None,
        }
    }

    pub fn business_name(&self) -> &str {
        &self.business_name
    }

    pub fn generator(&self) -> &Arc<ResponseGenerator> {
        &self.generator
    }

    pub async fn chat(&self, message: &str, user_id: Option<&str>) -> ChatReply {
        tracing::info!(user_id = user_id.unwrap_or("-"), "chat request");
        ChatReply {
            response: self.generator.generate_response(message).await,
        }
    }

    pub async fn explain(&self, message: &str) -> Exchange {
        self.generator.explain(message).await
    }

    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
