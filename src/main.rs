//! # toba CLI
//!
//! ## Usage
//!
//! ```bash
//! toba --config ./config/toba.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `toba init` | Create the SQLite database and run schema migrations |
//! | `toba ask "<message>"` | Answer one message through the full pipeline |
//! | `toba classify "<message>"` | Print the classified intent as JSON |
//! | `toba eval` | Run a question set and write JSON lines |
//! | `toba serve` | Start the chat HTTP server |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use toba_chat::config::{self, Config};
use toba_chat::llm::OllamaClient;
use toba_chat::service::ChatService;
use toba_chat::{eval, logging, migrate, server};
use toba_chat_core::classify::IntentClassifier;
use toba_chat_core::intent::classify_by_keywords;

/// Customer-support chatbot for a small e-commerce catalog.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/toba.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "toba",
    about = "Retrieval-augmented customer-support chatbot",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/toba.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file, the catalog tables and the
    /// document index tables. Safe to run repeatedly.
    Init,

    /// Answer one message.
    Ask {
        /// The customer's message.
        message: String,

        /// Print the classified intent and the retrieved context before the answer.
        #[arg(long)]
        show_context: bool,
    },

    /// Classify a message and print the intent as JSON.
    Classify {
        /// The customer's message.
        message: String,

        /// Use only the keyword rules; do not call the language model.
        #[arg(long)]
        keywords_only: bool,
    },

    /// Run a question set through the pipeline.
    ///
    /// Writes one JSON object per line: question, intent, context, answer.
    Eval {
        /// File with one question per line (default: built-in set).
        #[arg(long)]
        questions: Option<PathBuf>,

        /// Output file (default: stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Start the chat HTTP server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    // Keyword classification needs no config
    if let Commands::Classify {
        message,
        keywords_only: true,
    } = &cli.command
    {
        print_json(&classify_by_keywords(message).with_query(message.as_str()))?;
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ask {
            message,
            show_context,
        } => {
            run_ask(&cfg, &message, show_context).await?;
        }
        Commands::Classify { message, .. } => {
            let client = OllamaClient::new(&cfg.llm, &cfg.messages)?;
            let classifier = IntentClassifier::new(Arc::new(client));
            let intent = classifier.classify(&message).await.with_query(message.as_str());
            print_json(&intent)?;
        }
        Commands::Eval { questions, output } => {
            eval::run_eval(&cfg, questions.as_deref(), output.as_deref()).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}

async fn run_ask(cfg: &Config, message: &str, show_context: bool) -> Result<()> {
    let service = ChatService::open(cfg).await?;
    let exchange = service.explain(message).await;
    service.close().await;

    if show_context {
        println!("Intent:");
        println!("{}", serde_json::to_string_pretty(&exchange.intent)?);
        println!();
        println!("Context:");
        if exchange.context.is_empty() {
            println!("(none)");
        } else {
            println!("{}", exchange.context);
        }
        println!();
        println!("Answer:");
    }
    println!("{}", exchange.answer);
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
