//! # formurl
//!
//! CLI tool for inspecting formurl-sync filter configurations.
//!
//! ## Commands
//!
//! - `decode`: Show the form state a query string describes
//! - `encode`: Show the query string a form value is written as
//! - `simulate`: Run a sync session against an in-memory form and router
//!
//! ## Example
//!
//! ```bash
//! # What does this link put in the form?
//! formurl decode --config logger.toml '?title=Bug&level=warn,error'
//!
//! # What URL does this form value produce?
//! formurl encode --config logger.toml '{"title": "Bug", "level": ["warn"]}'
//!
//! # Replay a sequence of edits and navigations
//! formurl simulate --config logger.toml --initial '?title=Bug' session.txt
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod json;
mod query;

use commands::{decode, encode, simulate};
use config::FilterConfig;

/// CLI tool for inspecting formurl-sync filter configurations.
#[derive(Parser, Debug)]
#[command(name = "formurl")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log engine decisions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a query string into form state (JSON)
    Decode {
        /// Filter configuration file
        #[arg(long, short)]
        config: PathBuf,

        /// Query string, with or without the leading '?'
        query: String,
    },

    /// Encode a form value (JSON object) into a query string
    Encode {
        /// Filter configuration file
        #[arg(long, short)]
        config: PathBuf,

        /// Form value as a JSON object
        json: String,
    },

    /// Run a scripted sync session
    Simulate {
        /// Filter configuration file
        #[arg(long, short)]
        config: PathBuf,

        /// Query string the session starts on
        #[arg(long)]
        initial: Option<String>,

        /// Script file (reads stdin if omitted)
        script: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Decode { config, query } => {
            decode::run(&load_config(&config)?, &query)?;
        }
        Commands::Encode { config, json } => {
            encode::run(&load_config(&config)?, &json)?;
        }
        Commands::Simulate {
            config,
            initial,
            script,
        } => {
            let config = load_config(&config)?;
            let script = read_script(script.as_deref()).await?;
            simulate::run(&config, initial.as_deref(), &script).await?;
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<FilterConfig> {
    FilterConfig::from_file(path).context("Failed to load filter configuration")
}

async fn read_script(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read script {}", path.display())),
        None => {
            let mut script = String::new();
            tokio::io::stdin()
                .read_to_string(&mut script)
                .await
                .context("Failed to read script from stdin")?;
            Ok(script)
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` overrides.
fn init_tracing(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
