//! # toba-chat
//!
//! Retrieval-augmented customer-support chatbot for a small e-commerce
//! catalog. Questions about products, stock, orders and FAQs are answered
//! by a locally hosted language model (Ollama), grounded in the shop's
//! SQLite catalog and an optional document embedding index.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌──────────────┐   ┌───────────┐
//! │ CLI/HTTP │──▶│ Classifier │──▶│  Retriever    │──▶│ Generator │──▶ answer
//! │ (toba)   │   │ LLM+rules  │   │ SQLite+vector │   │  Ollama   │
//! └──────────┘   └────────────┘   └──────────────┘   └───────────┘
//! ```
//!
//! The runtime-free pieces (data model, store/index traits, intent
//! classification, context retrieval) live in the `toba-chat-core` crate.
//!
//! ## Quick Start
//!
//! ```bash
//! toba init                               # create database tables
//! toba ask "Berapa stok kain tenun?"      # one question
//! toba serve                              # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | Tracing subscriber setup |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`catalog`] | SQLite catalog store |
//! | [`embedding`] | Ollama query embeddings |
//! | [`vector_index`] | SQLite vector index |
//! | [`llm`] | Ollama generation client |
//! | [`generator`] | Response pipeline |
//! | [`service`] | Component wiring |
//! | [`server`] | Chat HTTP server |
//! | [`eval`] | Evaluation runner |

pub mod catalog;
pub mod config;
pub mod db;
pub mod embedding;
pub mod eval;
pub mod generator;
pub mod llm;
pub mod logging;
pub mod migrate;
pub mod server;
pub mod service;
pub mod vector_index;
