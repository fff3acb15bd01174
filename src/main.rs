mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use simplemem_bridge::bridge::recall::DEFAULT_TOP_K;
use simplemem_bridge::bridge::save::{DEFAULT_CONTEXT, DEFAULT_SPEAKER};
use simplemem_bridge::config::BridgeConfig;

#[derive(Parser)]
#[command(name = "simplemem", version, about = "Persistent memory bridge for AI agents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Database selection shared by save, recall, and status.
#[derive(clap::Args, Debug)]
struct StoreArgs {
    /// Database path (defaults to the configured global store)
    #[arg(long)]
    db_path: Option<PathBuf>,
    /// Use the project-specific database for the current directory (overrides --db-path)
    #[arg(long)]
    project: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Install SimpleMem and create its default config
    Install,
    /// Save information to memory
    Save {
        /// Content to save
        content: String,
        /// Speaker name
        #[arg(long, default_value = DEFAULT_SPEAKER)]
        speaker: String,
        /// Context/category tag
        #[arg(long, default_value = DEFAULT_CONTEXT)]
        context: String,
        /// Save as a conversation turn, with CONTENT as the user message
        #[arg(long)]
        assistant_message: Option<String>,
        /// Additional metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Recall relevant information from memory
    Recall {
        /// Search query
        query: String,
        /// Number of results
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
        /// Output as JSON (default)
        #[arg(long)]
        json: bool,
        /// Output only the context text
        #[arg(long)]
        text: bool,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Check installation status and database health
    Status {
        #[command(flatten)]
        store: StoreArgs,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            cli::print_failure(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let config = BridgeConfig::load()?;

    // Log to stderr so stdout stays a single JSON document.
    let filter = EnvFilter::try_new(&config.log.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Install => cli::install::run(&config).await,
        Command::Save {
            content,
            speaker,
            context,
            assistant_message,
            metadata,
            store,
        } => {
            let db_path = cli::resolve_db_path(&config, store.db_path.as_deref(), store.project)?;
            let args = cli::save::SaveArgs {
                content: &content,
                speaker: &speaker,
                context: &context,
                assistant_message: assistant_message.as_deref(),
                metadata: metadata.as_deref(),
            };
            cli::save::run(&config, &db_path, &args)
        }
        Command::Recall {
            query,
            top_k,
            json: _,
            text,
            store,
        } => {
            let db_path = cli::resolve_db_path(&config, store.db_path.as_deref(), store.project)?;
            cli::recall::run(&config, &db_path, &query, top_k, text)
        }
        Command::Status { store } => {
            let db_path = cli::resolve_db_path(&config, store.db_path.as_deref(), store.project)?;
            cli::status::run(&config, &db_path)
        }
    }
}
