//! # Main — CLI Entry Point
//!
//! Routes subcommands to the server, the maintenance job, or the terminal
//! front-end.
//!
//! ## Subcommands
//!
//! - `serve`: run the HTTP API (and optionally the static front-end).
//! - `prune`: delete objectives from previous UK days once and exit. Suitable
//!   for cron; `serve` also prunes on its own interval.
//! - `stats`, `xp`, `objectives`, `add`, `toggle`: terminal front-end talking
//!   to a running server through the cached API client.
//! - `pomodoro`: local 25-minute focus timer.
//!
//! ## Global Options
//!
//! - `--database-url` / `DATABASE_URL`: PostgreSQL connection (server side).
//! - `--api-url` / `LEVELUP_API_URL`: server origin (front-end side).
//! - `LOG_FORMAT=json` switches logs to JSON; `RUST_LOG` sets the filter.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use levelup::client::ApiClient;
use levelup::progression::Category;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "levelup", about = "Level up Health, Finance, Deen and Intellect one objective at a time")]
struct Cli {
    /// PostgreSQL connection URL (or set DATABASE_URL env var)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Server origin used by the front-end commands
    #[arg(long, env = "LEVELUP_API_URL", default_value = "http://localhost:5000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 5000)]
        port: u16,
        /// Directory to serve the built front-end from
        #[arg(long)]
        static_dir: Option<PathBuf>,
        /// Seconds between prunes of objectives from previous days
        #[arg(long, default_value_t = 3600)]
        prune_interval_secs: u64,
    },
    /// Delete objectives from previous UK days and exit
    Prune,
    /// Show level, rank and progress for every category
    Stats,
    /// Add (or with a negative value, remove) XP in one category
    Xp {
        /// health, finance, deen or intellect
        category: Category,
        /// XP to add; negative values subtract, floored at zero
        #[arg(allow_negative_numbers = true)]
        delta: i32,
    },
    /// List today's objectives
    Objectives,
    /// Add an objective for today
    Add {
        /// Objective text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Mark an objective done, or undo it
    Toggle {
        /// Objective id as shown by `objectives`
        id: i32,
    },
    /// Run a 25-minute focus timer (p = pause/resume, r = reset, q = quit)
    Pomodoro,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Server commands log at info; front-end commands keep stderr quiet
    let default_filter = match cli.command {
        Commands::Serve { .. } | Commands::Prune => "info",
        _ => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    match &cli.command {
        Commands::Serve {
            port,
            static_dir,
            prune_interval_secs,
        } => {
            let database_url = require_database_url(&cli)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(levelup::dashboard::run(
                *port,
                database_url,
                static_dir.as_deref(),
                std::time::Duration::from_secs((*prune_interval_secs).max(1)),
            ))
        }
        Commands::Prune => {
            let database_url = require_database_url(&cli)?;
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(cli::run_prune(database_url))
        }
        Commands::Stats => cli::run_stats(&ApiClient::connect(&cli.api_url)),
        Commands::Xp { category, delta } => {
            cli::run_xp(&ApiClient::connect(&cli.api_url), *category, *delta)
        }
        Commands::Objectives => cli::run_objectives(&ApiClient::connect(&cli.api_url)),
        Commands::Add { text } => cli::run_add(&ApiClient::connect(&cli.api_url), &text.join(" ")),
        Commands::Toggle { id } => cli::run_toggle(&ApiClient::connect(&cli.api_url), *id),
        Commands::Pomodoro => cli::run_pomodoro(),
    }
}

fn require_database_url(cli: &Cli) -> Result<&str> {
    cli.database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required (set via --database-url or env)"))
}
