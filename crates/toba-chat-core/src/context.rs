//! Labelled context fragments and their assembly into one prompt context.

use serde::Serialize;

use crate::models::{CustomerOrderSummary, DocumentChunk, Faq, OrderDetail, Product};

/// A labelled piece of context for the generation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextFragment {
    /// Short label used for logging (e.g. `"Informasi Stok"`).
    pub label: String,
    /// Full rendered text, label included.
    pub text: String,
}

/// Header placed before the document fragments.
pub const DOCUMENTS_HEADER: &str = "Informasi dari dokumen:";

fn pretty<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize context record");
            None
        }
    }
}

impl ContextFragment {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn product(product: &Product) -> Option<Self> {
        let json = pretty(product)?;
        Some(Self::new("Informasi Produk", format!("Informasi Produk: {}", json)))
    }

    pub fn stock(product: &Product) -> Self {
        Self::new(
            "Informasi Stok",
            format!(
                "Informasi Stok: Produk '{}' memiliki stok sebanyak {} unit.",
                product.name, product.stock
            ),
        )
    }

    pub fn order(detail: &OrderDetail) -> Option<Self> {
        let json = pretty(detail)?;
        Some(Self::new("Informasi Pesanan", format!("Informasi Pesanan: {}", json)))
    }

    pub fn customer_orders(orders: &[CustomerOrderSummary]) -> Option<Self> {
        let json = pretty(orders)?;
        Some(Self::new(
            "Daftar Pesanan Pelanggan",
            format!("Daftar Pesanan Pelanggan: {}", json),
        ))
    }

    pub fn faqs(faqs: &[Faq]) -> Self {
        let entries: Vec<String> = faqs
            .iter()
            .map(|f| format!("Q: {}\nA: {}", f.question, f.answer))
            .collect();
        Self::new(
            "Informasi FAQ",
            format!("Informasi FAQ yang relevan:\n{}", entries.join("\n\n")),
        )
    }

    /// The header fragment followed by one `Dokumen <n>` fragment per chunk.
    pub fn documents(chunks: &[DocumentChunk]) -> Vec<Self> {
        if chunks.is_empty() {
            return Vec::new();
        }
        let mut fragments = vec![Self::new("Dokumen", DOCUMENTS_HEADER)];
        fragments.extend(chunks.iter().enumerate().map(|(i, chunk)| {
            let label = format!("Dokumen {}", i + 1);
            let text = format!("{}: {}", label, chunk.text);
            Self::new(label, text)
        }));
        fragments
    }
}

/// Join fragments with blank lines, skipping empty ones.
pub fn assemble(fragments: &[ContextFragment]) -> String {
    fragments
        .iter()
        .filter(|f| !f.is_empty())
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
