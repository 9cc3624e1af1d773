//! Language model abstraction.
//!
//! [`LanguageModel::complete`] is the fallible primitive every backend
//! implements. [`LanguageModel::generate`] is the user-facing contract: it
//! never fails and answers with an apology sentence when the model cannot
//! be reached.

use anyhow::Result;
use async_trait::async_trait;

/// Returned by [`LanguageModel::generate`] when the model call fails.
pub const TRANSPORT_APOLOGY: &str =
    "Maaf, terjadi kesalahan saat berkomunikasi dengan model bahasa.";

/// Returned when the model answers without any text.
pub const EMPTY_RESPONSE: &str = "Maaf, saya tidak dapat menghasilkan respons saat ini.";

/// Returned by the response generator when the pipeline itself faults.
pub const INTERNAL_APOLOGY: &str =
    "Maaf, saya mengalami kesalahan saat memproses permintaan Anda. Mohon coba lagi nanti.";

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate text for `prompt`, optionally under a system instruction.
    ///
    /// Errors cover transport failures, timeouts and non-success statuses.
    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String>;

    /// Sentence returned by [`generate`](LanguageModel::generate) on failure.
    fn transport_apology(&self) -> &str {
        TRANSPORT_APOLOGY
    }

    /// Like [`complete`](LanguageModel::complete) but absorbs failures,
    /// logging them and answering with
    /// [`transport_apology`](LanguageModel::transport_apology).
    async fn generate(&self, prompt: &str, system: Option<&str>) -> String {
        match self.complete(prompt, system).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "language model call failed");
                self.transport_apology().to_string()
            }
        }
    }
}
