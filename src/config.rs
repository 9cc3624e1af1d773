//! TOML configuration.
//!
//! Only `[db]` is required; every other section and key has a default.
//! [`load_config`] parses the file, applies the `OLLAMA_BASE_URL` /
//! `OLLAMA_MODEL` environment overrides and validates the result.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use toba_chat_core::llm::{EMPTY_RESPONSE, INTERNAL_APOLOGY, TRANSPORT_APOLOGY};
use toba_chat_core::retrieve::RetrievalParams;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub business: BusinessConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessConfig {
    #[serde(default = "default_business_name")]
    pub name: String,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            name: default_business_name(),
        }
    }
}

fn default_business_name() -> String {
    "Rumah Kreatif Toba".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_llm_model() -> String {
    "llama3".to_string()
}
fn default_llm_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: Option<String>,
    #[serde(default = "default_ollama_url")]
    pub url: String,
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_embedding_model(),
            url: default_ollama_url(),
            timeout_secs: default_embedding_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_embedding_model() -> Option<String> {
    Some("nomic-embed-text".to_string())
}
// Query embedding sits on the request path: one short attempt by default.
fn default_embedding_timeout_secs() -> u64 {
    5
}
fn default_max_retries() -> u32 {
    0
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_document_k")]
    pub document_k: usize,
    #[serde(default = "default_faq_candidate_k")]
    pub faq_candidate_k: usize,
    #[serde(default = "default_faq_fallback_limit")]
    pub faq_fallback_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            document_k: default_document_k(),
            faq_candidate_k: default_faq_candidate_k(),
            faq_fallback_limit: default_faq_fallback_limit(),
        }
    }
}

impl RetrievalConfig {
    pub fn params(&self) -> RetrievalParams {
        RetrievalParams {
            document_k: self.document_k,
            faq_candidate_k: self.faq_candidate_k,
            faq_fallback_limit: self.faq_fallback_limit,
        }
    }
}

fn default_document_k() -> usize {
    3
}
fn default_faq_candidate_k() -> usize {
    5
}
fn default_faq_fallback_limit() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

/// User-facing fallback sentences.
#[derive(Debug, Deserialize, Clone)]
pub struct MessagesConfig {
    #[serde(default = "default_transport_apology")]
    pub transport_apology: String,
    #[serde(default = "default_empty_response")]
    pub empty_response: String,
    #[serde(default = "default_internal_apology")]
    pub internal_apology: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            transport_apology: default_transport_apology(),
            empty_response: default_empty_response(),
            internal_apology: default_internal_apology(),
        }
    }
}

fn default_transport_apology() -> String {
    TRANSPORT_APOLOGY.to_string()
}
fn default_empty_response() -> String {
    EMPTY_RESPONSE.to_string()
}
fn default_internal_apology() -> String {
    INTERNAL_APOLOGY.to_string()
}

impl Config {
    /// A configuration with every default and the given database path.
    pub fn minimal(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db: DbConfig {
                path: db_path.into(),
            },
            business: BusinessConfig::default(),
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            server: ServerConfig::default(),
            messages: MessagesConfig::default(),
        }
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("OLLAMA_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.llm.base_url = url;
        }
        if let Some(model) = lookup("OLLAMA_MODEL").filter(|v| !v.trim().is_empty()) {
            self.llm.model = model;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.business.name.trim().is_empty() {
            bail!("business.name must not be empty");
        }

        if self.llm.timeout_secs == 0 {
            bail!("llm.timeout_secs must be > 0");
        }
        if self.llm.model.trim().is_empty() {
            bail!("llm.model must not be empty");
        }

        if self.embedding.timeout_secs == 0 {
            bail!("embedding.timeout_secs must be > 0");
        }

        if self.retrieval.document_k < 1 {
            bail!("retrieval.document_k must be >= 1");
        }
        if self.retrieval.faq_fallback_limit < 1 {
            bail!("retrieval.faq_fallback_limit must be >= 1");
        }

        match self.embedding.provider.as_str() {
            "disabled" | "ollama" => {}
            other => bail!(
                "Unknown embedding provider: '{}'. Must be disabled or ollama.",
                other
            ),
        }
        if self.embedding.is_enabled() && self.embedding.model.is_none() {
            bail!(
                "embedding.model must be specified when provider is '{}'",
                self.embedding.provider
            );
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Parse, override and validate a configuration document.
pub fn parse_config<F>(content: &str, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: Config =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.apply_overrides(lookup);
    config.validate()?;
    Ok(config)
}
