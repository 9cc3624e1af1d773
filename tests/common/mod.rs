#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Mutex;

use toba_chat::config::Config;
use toba_chat::{db, migrate};
use toba_chat_core::embedding::{vec_to_blob, QueryEmbedder};
use toba_chat_core::llm::LanguageModel;

pub async fn seeded_pool(dir: &Path) -> (Config, SqlitePool) {
    let config = Config::minimal(dir.join("data").join("toba.sqlite"));
    let pool = db::connect(&config).await.unwrap();
    migrate::migrate_pool(&pool).await.unwrap();
    seed_catalog(&pool).await;
    (config, pool)
}

pub async fn seed_catalog(pool: &SqlitePool) {
    let statements = [
        "INSERT INTO produk (id, nama, deskripsi, kategori, harga, stok) VALUES \
         (1, 'Kain Tenun Toba', 'Kain tenun tangan motif Batak', 'Tenun', 350000, 42), \
         (2, 'Ulos Ragi Hotang', NULL, 'Ulos', 500000, 7), \
         (3, 'Tas Anyaman Pandan', 'Tas anyaman dari daun pandan', 'Anyaman', 125000, 0)",
        "INSERT INTO pelanggan (id, nama, email, telepon, alamat) VALUES \
         (5, 'Rina Siregar', 'rina@example.com', '0812000000', 'Balige')",
        "INSERT INTO pesanan (id, pelanggan_id, tanggal_pesanan, status, total_harga) VALUES \
         (100, 5, '2024-06-02 14:00:00', 'dikirim', 1050000), \
         (101, 5, '2024-07-10 09:30:00', 'pending', 125000)",
        "INSERT INTO pesanan_item (pesanan_id, produk_id, jumlah, harga_satuan, subtotal) VALUES \
         (100, 1, 3, 350000, 1050000), \
         (101, 99, 1, 125000, 125000)",
        "INSERT INTO faq (id, pertanyaan, jawaban, kategori, aktif) VALUES \
         (1, 'Berapa lama pengiriman ke Jakarta?', 'Pengiriman ke Jakarta memakan waktu 3-5 hari kerja.', 'pengiriman', 1), \
         (2, 'Apakah bisa retur barang?', 'Retur tidak lagi dilayani.', 'retur', 0), \
         (3, 'Metode pembayaran apa saja yang tersedia?', 'Transfer bank dan e-wallet.', 'pembayaran', 1)",
    ];
    for sql in statements {
        sqlx::query(sql).execute(pool).await.unwrap();
    }
}

pub async fn insert_chunk(pool: &SqlitePool, id: i64, source_id: Option<&str>, text: &str, vector: &[f32]) {
    sqlx::query("INSERT INTO doc_chunks (id, source_id, text) VALUES (?, ?, ?)")
        .bind(id)
        .bind(source_id)
        .bind(text)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO chunk_vectors (chunk_id, model, dims, embedding) VALUES (?, 'test', ?, ?)")
        .bind(id)
        .bind(vector.len() as i64)
        .bind(vec_to_blob(vector))
        .execute(pool)
        .await
        .unwrap();
}

/// Three-dimensional topic embedder: tenun, pengiriman, everything else.
pub struct TopicEmbedder;

#[async_trait]
impl QueryEmbedder for TopicEmbedder {
    fn model_name(&self) -> &str {
        "topic-test"
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let text = text.to_lowercase();
        if text.contains("tenun") {
            Ok(vec![1.0, 0.1, 0.0])
        } else if text.contains("kirim") {
            Ok(vec![0.0, 1.0, 0.1])
        } else {
            Ok(vec![0.1, 0.0, 1.0])
        }
    }
}

/// A language model double.
///
/// Intent-extraction prompts (ending in `Output JSON:`) get `intent_reply`,
/// or a connection error when it is `None`. Every other prompt gets
/// `answer` and is recorded with its system instruction.
pub struct ScriptedModel {
    pub intent_reply: Option<String>,
    pub answer: String,
    pub calls: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedModel {
    pub fn offline_intent(answer: &str) -> Self {
        Self {
            intent_reply: None,
            answer: answer.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_intent(intent_reply: &str, answer: &str) -> Self {
        Self {
            intent_reply: Some(intent_reply.to_string()),
            answer: answer.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn generation_calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<String> {
        if prompt.ends_with("Output JSON:") {
            return match &self.intent_reply {
                Some(reply) => Ok(reply.clone()),
                None => bail!("connection refused"),
            };
        }
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), system.map(str::to_string)));
        Ok(self.answer.clone())
    }
}

/// Fails every call, as an unreachable server would.
pub struct Unreachable;

#[async_trait]
impl LanguageModel for Unreachable {
    async fn complete(&self, _prompt: &str, _system: Option<&str>) -> Result<String> {
        bail!("error sending request: connection refused")
    }
}

/// Panics on the generation call.
pub struct Panicking;

#[async_trait]
impl LanguageModel for Panicking {
    async fn complete(&self, prompt: &str, _system: Option<&str>) -> Result<String> {
        if prompt.ends_with("Output JSON:") {
            bail!("connection refused");
        }
        panic!("model backend exploded");
    }
}
