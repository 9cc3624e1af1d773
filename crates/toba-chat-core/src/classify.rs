//! LLM-backed intent classification with a keyword fallback.

use std::sync::Arc;

use crate::intent::{classify_by_keywords, decode_llm_intent, Intent, IntentKind};
use crate::llm::LanguageModel;

/// Build the instruction sent to the model for intent extraction.
pub fn intent_prompt(query: &str) -> String {
    let tags: Vec<&str> = IntentKind::ALL.iter().map(|k| k.as_str()).collect();
    format!(
        "Analisis pertanyaan pelanggan berikut, lalu tentukan intent dan entitasnya.\n\
         Jawab HANYA dengan satu objek JSON berkunci \"intent\" dan \"entities\".\n\
         \n\
         Pertanyaan: {query}\n\
         \n\
         Intent yang tersedia:\n\
         - product_info (informasi produk)\n\
         - stock_check (cek stok barang)\n\
         - order_status (status pesanan)\n\
         - customer_orders (daftar pesanan pelanggan)\n\
         - faq (pertanyaan umum seputar toko)\n\
         - general (pertanyaan lain yang tidak spesifik)\n\
         \n\
         Nama entitas yang disarankan: produk_id, produk_nama, pesanan_id, pelanggan_id, kategori.\n\
         Nilai intent harus salah satu dari: {tags}.\n\
         \n\
         Output JSON:",
        query = query,
        tags = tags.join(", "),
    )
}

/// Maps free text to an [`Intent`].
///
/// Asks the language model first. If the call fails, or its answer does not
/// decode to a known intent, the deterministic keyword rules decide instead,
/// so [`classify`](IntentClassifier::classify) never fails.
pub struct IntentClassifier {
    model: Arc<dyn LanguageModel>,
}

impl IntentClassifier {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn classify(&self, query: &str) -> Intent {
        let response = match self.model.complete(&intent_prompt(query), None).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "intent extraction call failed; using keyword rules");
                return classify_by_keywords(query);
            }
        };

        match decode_llm_intent(&response) {
            Ok(intent) => intent,
            Err(e) => {
                tracing::warn!(error = %e, "could not decode model intent; using keyword rules");
                classify_by_keywords(query)
            }
        }
    }
}
