//! Intents, entities, and the deterministic keyword classifier.
//!
//! An [`Intent`] is the classified purpose of one user message plus the
//! entities that parameterize retrieval. Two producers exist:
//!
//! - [`classify_by_keywords`]: fixed keyword rules, always available.
//! - [`decode_llm_intent`]: best-effort decoding of a language model's
//!   brace-delimited JSON answer.
//!
//! The classifier in [`crate::classify`] tries the second and falls back
//! to the first.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entity key for a product id.
pub const PRODUCT_ID: &str = "produk_id";
/// Entity key for a product name fragment.
pub const PRODUCT_NAME: &str = "produk_nama";
/// Entity key for an order id.
pub const ORDER_ID: &str = "pesanan_id";
/// Entity key for a customer id.
pub const CUSTOMER_ID: &str = "pelanggan_id";
/// Entity key for a FAQ category.
pub const CATEGORY: &str = "kategori";

/// The closed set of intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    ProductInfo,
    StockCheck,
    OrderStatus,
    CustomerOrders,
    Faq,
    General,
}

impl IntentKind {
    pub const ALL: [IntentKind; 6] = [
        IntentKind::ProductInfo,
        IntentKind::StockCheck,
        IntentKind::OrderStatus,
        IntentKind::CustomerOrders,
        IntentKind::Faq,
        IntentKind::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::ProductInfo => "product_info",
            IntentKind::StockCheck => "stock_check",
            IntentKind::OrderStatus => "order_status",
            IntentKind::CustomerOrders => "customer_orders",
            IntentKind::Faq => "faq",
            IntentKind::General => "general",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentKind {
    type Err = anyhow::Error;

    /// Accepts the canonical tags and the Indonesian spellings
    /// (`produk_info`, `stok_check`) models tend to echo back.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "product_info" | "produk_info" => Ok(IntentKind::ProductInfo),
            "stock_check" | "stok_check" => Ok(IntentKind::StockCheck),
            "order_status" => Ok(IntentKind::OrderStatus),
            "customer_orders" => Ok(IntentKind::CustomerOrders),
            "faq" => Ok(IntentKind::Faq),
            "general" => Ok(IntentKind::General),
            other => bail!("unknown intent: '{}'", other),
        }
    }
}

/// A classified user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Intent {
    #[serde(rename = "intent")]
    pub kind: IntentKind,
    pub entities: BTreeMap<String, String>,
    /// The original user message. Attached by the response generator before
    /// retrieval; empty until then.
    pub query: String,
}

impl Intent {
    pub fn new(kind: IntentKind) -> Self {
        Self {
            kind,
            entities: BTreeMap::new(),
            query: String::new(),
        }
    }

    pub fn general() -> Self {
        Self::new(IntentKind::General)
    }

    pub fn with_entity(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entities.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// A non-blank entity value, checked under each of `keys` in order.
    fn first_entity(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.entities.get(*k))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    pub fn product_id(&self) -> Option<i64> {
        self.first_entity(&[PRODUCT_ID, "product_id"]).and_then(parse_id)
    }

    pub fn product_name(&self) -> Option<&str> {
        self.first_entity(&[PRODUCT_NAME, "product_name", "nama_produk"])
    }

    pub fn order_id(&self) -> Option<i64> {
        self.first_entity(&[ORDER_ID, "order_id"]).and_then(parse_id)
    }

    pub fn customer_id(&self) -> Option<i64> {
        self.first_entity(&[CUSTOMER_ID, "customer_id"]).and_then(parse_id)
    }

    pub fn category(&self) -> Option<&str> {
        self.first_entity(&[CATEGORY, "category"])
    }
}

/// Parse an id entity such as `"42"`, `"#42"` or `"42.0"`.
fn parse_id(raw: &str) -> Option<i64> {
    let raw = raw.trim().trim_start_matches('#').trim();
    if let Ok(id) = raw.parse::<i64>() {
        return Some(id);
    }
    match raw.parse::<f64>() {
        // 2^63 itself is out of range; `as` would saturate it to i64::MAX.
        Ok(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Some(f as i64)
        }
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Keyword classifier
// ═══════════════════════════════════════════════════════════════════════

const PRODUCT_KEYWORDS: &[&str] = &["produk", "barang", "item", "harga", "stok"];
const ORDER_KEYWORDS: &[&str] = &["status", "pesanan", "order"];
const CUSTOMER_KEYWORDS: &[&str] = &["pelanggan", "customer", "saya", "pesanan saya"];
const FAQ_KEYWORDS: &[&str] = &["faq", "pertanyaan", "tanya", "informasi"];

/// Words that precede an id ("produk 12", "pelanggan 3").
const PRODUCT_ID_MARKERS: &[&str] = &["produk", "id", "nomor", "no"];
const CUSTOMER_ID_MARKERS: &[&str] = &["pelanggan", "customer", "id"];

/// Words dropped when guessing a product name from the message.
const NAME_STOPWORDS: &[&str] = &[
    "ada", "anda", "apa", "apakah", "atau", "bagaimana", "barang", "berapa", "berapakah",
    "bisa", "cek", "dan", "dari", "di", "dijual", "dong", "harga", "id", "info", "informasi",
    "ingin", "ini", "item", "itu", "jual", "jumlah", "kak", "kalian", "ke", "kah", "kami",
    "masih", "mau", "mohon", "nomor", "no", "oleh", "online", "produk", "saat", "saja",
    "sekarang", "sisa", "stok", "tahu", "tentang", "toko", "tersedia", "tolong", "untuk",
    "ya", "yang",
];

fn tokenize(lowered: &str) -> Vec<&str> {
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_number(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_digit())
}

/// The first number token directly after one of `markers`.
fn number_after<'a>(tokens: &[&'a str], markers: &[&str]) -> Option<&'a str> {
    tokens
        .windows(2)
        .find(|w| markers.contains(&w[0]) && is_number(w[1]))
        .map(|w| w[1])
}

fn product_entities(mut intent: Intent, tokens: &[&str]) -> Intent {
    if let Some(id) = number_after(tokens, PRODUCT_ID_MARKERS) {
        intent = intent.with_entity(PRODUCT_ID, id);
    }
    let name: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| !is_number(t) && !NAME_STOPWORDS.contains(t))
        .collect();
    if !name.is_empty() {
        intent = intent.with_entity(PRODUCT_NAME, name.join(" "));
    }
    intent
}

/// Rule-based classification.
///
/// Lower-cases the query and tests keyword membership in a fixed order;
/// the first matching rule wins:
///
/// 1. product keywords → `stock_check` when "stok" occurs, else `product_info`
/// 2. order keywords → `order_status`
/// 3. customer keywords → `customer_orders`
/// 4. FAQ keywords → `faq`
/// 5. otherwise `general` with no entities
///
/// Entities are guessed from the message for the chosen intent so the
/// retriever still has something to look up.
pub fn classify_by_keywords(query: &str) -> Intent {
    let lowered = query.to_lowercase();
    let has_any = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));
    let tokens = tokenize(&lowered);

    if has_any(PRODUCT_KEYWORDS) {
        let kind = if lowered.contains("stok") {
            IntentKind::StockCheck
        } else {
            IntentKind::ProductInfo
        };
        return product_entities(Intent::new(kind), &tokens);
    }

    if has_any(ORDER_KEYWORDS) {
        let intent = Intent::new(IntentKind::OrderStatus);
        return match tokens.iter().find(|t| is_number(t)) {
            Some(id) => intent.with_entity(ORDER_ID, *id),
            None => intent,
        };
    }

    if has_any(CUSTOMER_KEYWORDS) {
        let intent = Intent::new(IntentKind::CustomerOrders);
        return match number_after(&tokens, CUSTOMER_ID_MARKERS) {
            Some(id) => intent.with_entity(CUSTOMER_ID, id),
            None => intent,
        };
    }

    if has_any(FAQ_KEYWORDS) {
        return Intent::new(IntentKind::Faq);
    }

    Intent::general()
}

// ═══════════════════════════════════════════════════════════════════════
// LLM answer decoding
// ═══════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct RawIntent {
    intent: String,
    #[serde(default)]
    entities: Option<serde_json::Map<String, Value>>,
}

fn entity_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Decode an intent from free-form model output.
///
/// Takes the text between the first `{` and the last `}` and parses it as
/// `{"intent": <tag>, "entities": {...}}`. Fails when there is no brace
/// pair, the JSON is malformed, or the tag is unknown.
pub fn decode_llm_intent(response: &str) -> Result<Intent> {
    let start = response
        .find('{')
        .ok_or_else(|| anyhow!("no JSON object in model output"))?;
    let end = response
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| anyhow!("unterminated JSON object in model output"))?;

    let raw: RawIntent = serde_json::from_str(&response[start..=end])
        .context("model output is not a valid intent object")?;
    let kind: IntentKind = raw.intent.parse()?;

    let entities = raw
        .entities
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| entity_text(v).map(|v| (k, v)))
        .collect();

    Ok(Intent {
        kind,
        entities,
        query: String::new(),
    })
}
