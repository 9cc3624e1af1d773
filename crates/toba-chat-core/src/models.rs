//! Catalog records and retrieved document chunks.
//!
//! Records are read-only projections of the catalog tables (`produk`,
//! `pelanggan`, `pesanan`, `pesanan_item`, `faq`). Field names are English;
//! the serialized keys keep the catalog's column names because the
//! serialized form is what the language model reads in its context.

use chrono::NaiveDateTime;
use serde::Serialize;

/// A row of the `produk` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: i64,
    #[serde(rename = "nama")]
    pub name: String,
    #[serde(rename = "deskripsi")]
    pub description: Option<String>,
    #[serde(rename = "kategori")]
    pub category: String,
    #[serde(rename = "harga")]
    pub price: f64,
    #[serde(rename = "stok")]
    pub stock: i64,
}

/// A row of the `pelanggan` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub id: i64,
    #[serde(rename = "nama")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telepon")]
    pub phone: Option<String>,
    #[serde(rename = "alamat")]
    pub address: Option<String>,
}

/// A row of the `pesanan` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: i64,
    #[serde(rename = "pelanggan_id")]
    pub customer_id: i64,
    #[serde(rename = "tanggal_pesanan")]
    pub ordered_at: NaiveDateTime,
    pub status: String,
    #[serde(rename = "total_harga")]
    pub total: f64,
}

/// A row of the `pesanan_item` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    #[serde(rename = "pesanan_id")]
    pub order_id: i64,
    #[serde(rename = "produk_id")]
    pub product_id: i64,
    #[serde(rename = "jumlah")]
    pub quantity: i64,
    #[serde(rename = "harga_satuan")]
    pub unit_price: f64,
    pub subtotal: f64,
}

/// An order line with its product resolved to a display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    #[serde(rename = "produk_nama")]
    pub product_name: String,
    #[serde(rename = "jumlah")]
    pub quantity: i64,
    #[serde(rename = "harga_satuan")]
    pub unit_price: f64,
    pub subtotal: f64,
}

/// Name used for order lines whose product row no longer exists.
pub const UNKNOWN_PRODUCT: &str = "Unknown";

/// An order together with its resolved lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderLine>,
}

/// One entry of a customer's order history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerOrderSummary {
    pub id: i64,
    #[serde(rename = "tanggal_pesanan")]
    pub ordered_at: NaiveDateTime,
    pub status: String,
    #[serde(rename = "total_harga")]
    pub total: f64,
}

impl From<&Order> for CustomerOrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            ordered_at: order.ordered_at,
            status: order.status.clone(),
            total: order.total,
        }
    }
}

/// A row of the `faq` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Faq {
    pub id: i64,
    #[serde(rename = "pertanyaan")]
    pub question: String,
    #[serde(rename = "jawaban")]
    pub answer: String,
    #[serde(rename = "kategori")]
    pub category: Option<String>,
    #[serde(rename = "aktif")]
    pub active: bool,
}

impl Faq {
    /// Text used for keyword relevance matching.
    pub fn searchable_text(&self) -> String {
        format!("Pertanyaan: {}\nJawaban: {}", self.question, self.answer)
    }
}

/// Prefix of chunk source ids that point back to a FAQ row.
pub const FAQ_SOURCE_PREFIX: &str = "faq:";

/// A text chunk returned by a [`VectorIndex`](crate::index::VectorIndex).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    pub text: String,
    /// Identifier of the chunk's origin, when the index recorded one.
    pub source_id: Option<String>,
}

impl DocumentChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_id: None,
        }
    }

    pub fn with_source(text: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_id: Some(source_id.into()),
        }
    }

    /// The FAQ row id this chunk was built from, if its source id is `faq:<id>`.
    pub fn faq_id(&self) -> Option<i64> {
        self.source_id
            .as_deref()?
            .strip_prefix(FAQ_SOURCE_PREFIX)?
            .trim()
            .parse()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faq_id_from_source() {
        assert_eq!(DocumentChunk::with_source("x", "faq:12").faq_id(), Some(12));
        assert_eq!(DocumentChunk::with_source("x", "manual.pdf").faq_id(), None);
        assert_eq!(DocumentChunk::with_source("x", "faq:abc").faq_id(), None);
        assert_eq!(DocumentChunk::new("x").faq_id(), None);
    }

    #[test]
    fn order_detail_serializes_flat() {
        let detail = OrderDetail {
            order: Order {
                id: 7,
                customer_id: 3,
                ordered_at: NaiveDateTime::parse_from_str("2024-05-01 10:00:00", "%Y-%m-%d %H:%M:%S")
                    .unwrap(),
                status: "dikirim".to_string(),
                total: 250000.0,
            },
            items: vec![OrderLine {
                product_name: "Ulos Ragi Hotang".to_string(),
                quantity: 1,
                unit_price: 250000.0,
                subtotal: 250000.0,
            }],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["pelanggan_id"], 3);
        assert_eq!(json["tanggal_pesanan"], "2024-05-01T10:00:00");
        assert_eq!(json["items"][0]["produk_nama"], "Ulos Ragi Hotang");
    }
}
