//! Ollama generation client.
//!
//! Stateless wrapper around `POST {base_url}/api/generate` with
//! `stream: false`. [`OllamaClient::try_generate`] returns a typed
//! [`LlmError`]; [`OllamaClient::generate`] never fails and answers with the
//! configured apology instead.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use toba_chat_core::llm::LanguageModel;

use crate::config::{LlmConfig, MessagesConfig};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model request timed out after {0}s")]
    Timeout(u64),
    #[error("language model transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("language model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode language model response: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout_secs: u64,
    transport_apology: String,
    empty_response: String,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig, messages: &MessagesConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            transport_apology: messages.transport_apology.clone(),
            empty_response: messages.empty_response.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One generation call. A success without a `response` field yields the
    /// "cannot generate" sentence.
    pub async fn try_generate(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, LlmError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.timeout_secs)
            } else {
                LlmError::Decode(e)
            }
        })?;

        Ok(parsed
            .response
            .unwrap_or_else(|| self.empty_response.clone()))
    }

    fn transport_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.timeout_secs)
        } else {
            LlmError::Transport(e)
        }
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String> {
        tracing::debug!(model = %self.model, prompt_len = prompt.len(), system = system.is_some(), "calling language model");
        Ok(self.try_generate(prompt, system).await?)
    }

    fn transport_apology(&self) -> &str {
        &self.transport_apology
    }
}
