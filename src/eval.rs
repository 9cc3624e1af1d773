//! Offline evaluation runner.
//!
//! Runs a question set through the full pipeline and writes one JSON line
//! per question with the classified intent, the retrieved context and the
//! answer, for scoring with external RAG evaluation tools.

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use toba_chat_core::intent::Intent;

use crate::config::Config;
use crate::service::ChatService;

/// Built-in question set covering the catalog, ordering and FAQ paths.
pub const DEFAULT_QUESTIONS: [&str; 7] = [
    "Apa saja produk yang dijual oleh Rumah Kreatif Toba?",
    "Berapa stok produk kain tenun yang tersedia?",
    "Bagaimana cara memesan produk dari Rumah Kreatif Toba?",
    "Berapa lama waktu pengiriman untuk wilayah Jakarta?",
    "Bisakah saya melacak pesanan saya?",
    "Apakah ada diskon untuk pembelian dalam jumlah besar?",
    "Apa bahan dasar kerajinan tangan yang dijual?",
];

#[derive(Debug, Serialize)]
pub struct EvalRecord {
    pub question: String,
    pub intent: Intent,
    pub context: String,
    pub answer: String,
}

/// One question per non-blank line; `#` starts a comment line.
pub fn parse_questions(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub fn load_questions(path: Option<&Path>) -> Result<Vec<String>> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read questions file: {}", path.display()))?;
            let questions = parse_questions(&content);
            if questions.is_empty() {
                anyhow::bail!("questions file has no questions: {}", path.display());
            }
            Ok(questions)
        }
        None => Ok(DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect()),
    }
}

/// Answer every question and write the records as JSON lines to `out`.
pub async fn evaluate<W: Write>(
    service: &ChatService,
    questions: &[String],
    out: &mut W,
) -> Result<Vec<EvalRecord>> {
    let mut records = Vec::with_capacity(questions.len());

    for (i, question) in questions.iter().enumerate() {
        tracing::info!(n = i + 1, total = questions.len(), question = %question, "evaluating");
        let exchange = service.explain(question).await;
        let record = EvalRecord {
            question: question.clone(),
            intent: exchange.intent,
            context: exchange.context,
            answer: exchange.answer,
        };
        serde_json::to_writer(&mut *out, &record)?;
        writeln!(out)?;
        records.push(record);
    }

    out.flush()?;
    Ok(records)
}

/// Entry point for `toba eval`.
pub async fn run_eval(config: &Config, questions: Option<&Path>, output: Option<&Path>) -> Result<()> {
    let questions = load_questions(questions)?;
    let service = ChatService::open(config).await?;

    let result = match output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut writer = std::io::BufWriter::new(file);
            evaluate(&service, &questions, &mut writer).await
        }
        None => {
            let mut stdout = std::io::stdout();
            evaluate(&service, &questions, &mut stdout).await
        }
    };

    service.close().await;
    let records = result?;
    eprintln!("Evaluated {} questions.", records.len());
    Ok(())
}
