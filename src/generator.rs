//! Response generation: classify → retrieve → generate.
//!
//! The pipeline runs in its own tokio task so that a panic anywhere inside
//! it is contained. Language-model failures are absorbed by
//! [`LanguageModel::generate`] and surface as the transport apology; any
//! other fault surfaces as the internal apology. Neither reaches the
//! caller as an error. A blank query is answered with the internal apology
//! without running the pipeline.

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use toba_chat_core::classify::IntentClassifier;
use toba_chat_core::intent::Intent;
use toba_chat_core::llm::{LanguageModel, INTERNAL_APOLOGY};
use toba_chat_core::retrieve::ContextRetriever;

/// Pipeline stages, logged at debug level as a request moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Classifying,
    RetrievingContext,
    Generating,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Classifying => "classifying",
            Stage::RetrievingContext => "retrieving_context",
            Stage::Generating => "generating",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Everything one request produced: the intent, the context the model saw,
/// and the answer.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub intent: Intent,
    pub context: String,
    pub answer: String,
}

pub fn user_prompt(query: &str) -> String {
    format!(
        "Pengguna: {}\n\nBerdasarkan informasi berikut, berikan respons yang tepat:",
        query
    )
}

/// System instruction carrying the retrieved context; `None` when there is
/// no context to carry.
pub fn system_instruction(business: &str, context: &str) -> Option<String> {
    if context.trim().is_empty() {
        return None;
    }
    Some(format!(
        "Anda adalah chatbot layanan pelanggan untuk {}. Gunakan informasi ini untuk menjawab pertanyaan pengguna: {}",
        business, context
    ))
}

fn enter(stage: Stage) {
    tracing::debug!(stage = %stage, "pipeline stage");
}

pub struct ResponseGenerator {
    classifier: IntentClassifier,
    retriever: ContextRetriever,
    model: Arc<dyn LanguageModel>,
    business_name: String,
    internal_apology: String,
}

impl ResponseGenerator {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        retriever: ContextRetriever,
        business_name: impl Into<String>,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(model.clone()),
            retriever,
            model,
            business_name: business_name.into(),
            internal_apology: INTERNAL_APOLOGY.to_string(),
        }
    }

    pub fn with_internal_apology(mut self, apology: impl Into<String>) -> Self {
        self.internal_apology = apology.into();
        self
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn retriever(&self) -> &ContextRetriever {
        &self.retriever
    }

    /// Answer `query`. Always returns a sentence for the user.
    pub async fn generate_response(self: &Arc<Self>, query: &str) -> String {
        self.explain(query).await.answer
    }

    /// Run the pipeline and return the intent and context along with the
    /// answer. On an internal fault the intent is `general`, the context is
    /// empty and the answer is the internal apology.
    pub async fn explain(self: &Arc<Self>, query: &str) -> Exchange {
        enter(Stage::Received);
        if query.trim().is_empty() {
            enter(Stage::Failed);
            tracing::warn!("blank query; skipping pipeline");
            return self.apology(query);
        }

        let this = Arc::clone(self);
        let owned = query.to_string();
        let handle = tokio::spawn(async move { this.run(&owned).await });

        let failure = match handle.await {
            Ok(Ok(exchange)) => return exchange,
            Ok(Err(e)) => format!("{:#}", e),
            Err(e) => format!("pipeline task failed: {}", e),
        };

        enter(Stage::Failed);
        tracing::error!(error = %failure, "response generation failed");
        self.apology(query)
    }

    fn apology(&self, query: &str) -> Exchange {
        Exchange {
            intent: Intent::general().with_query(query),
            context: String::new(),
            answer: self.internal_apology.clone(),
        }
    }

    async fn run(&self, query: &str) -> Result<Exchange> {
        enter(Stage::Classifying);
        let intent = self.classifier.classify(query).await.with_query(query);
        tracing::info!(intent = %intent.kind, entities = ?intent.entities, "classified query");

        enter(Stage::RetrievingContext);
        let context = self.retriever.retrieve_context(&intent).await;

        enter(Stage::Generating);
        let system = system_instruction(&self.business_name, &context);
        let answer = self
            .model
            .generate(&user_prompt(query), system.as_deref())
            .await;

        enter(Stage::Done);
        Ok(Exchange {
            intent,
            context,
            answer,
        })
    }
}
