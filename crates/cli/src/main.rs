//! OpenClaw CLI: the main entry point.
//!
//! Commands:
//! - `onboard` - Write a default config and create the data directory
//! - `chat`    - Interactive or single-message chat with the agent
//! - `todos`   - Inspect and edit the to-do list
//! - `memory`  - Inspect long-term memory
//! - `doctor`  - Diagnose configuration and backends

use clap::{Parser, Subcommand};

mod bootstrap;
mod commands;

#[derive(Parser)]
#[command(
    name = "openclaw",
    about = "OpenClaw - a local reasoning agent with tools and long-term memory",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration and create the data directory
    Onboard,

    /// Chat with the agent
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Print the reasoning log after every answer
        #[arg(long)]
        debug: bool,
    },

    /// Show or edit the to-do list
    Todos {
        #[command(subcommand)]
        action: Option<TodoAction>,
    },

    /// Inspect long-term memory
    Memory {
        #[command(subcommand)]
        action: Option<MemoryAction>,
    },

    /// Diagnose configuration and backends
    Doctor,
}

#[derive(Subcommand)]
enum TodoAction {
    /// List every task
    List,
    /// Add a pending task
    Add { description: String },
    /// Complete the pending task best matching the description
    Done { description: String },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Show backend and record count
    Stats,
    /// List stored facts
    List,
    /// Recall the facts most similar to a query
    Search {
        query: String,
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat { message, debug } => commands::chat::run(message, debug).await?,
        Commands::Todos { action } => match action.unwrap_or(TodoAction::List) {
            TodoAction::List => commands::todos::list().await?,
            TodoAction::Add { description } => commands::todos::add(&description).await?,
            TodoAction::Done { description } => commands::todos::done(&description).await?,
        },
        Commands::Memory { action } => match action.unwrap_or(MemoryAction::Stats) {
            MemoryAction::Stats => commands::memory::stats().await?,
            MemoryAction::List => commands::memory::list().await?,
            MemoryAction::Search { query, limit } => commands::memory::search(&query, limit).await?,
        },
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
