//! # chunkq CLI
//!
//! Sends a large text through a chat-completion endpoint in bounded chunks
//! and aggregates the JSON replies.
//!
//! ## Usage
//!
//! ```bash
//! chunkq --config ./config/chunkq.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `chunkq run` | Split the source, query every chunk, deliver the aggregated JSON |
//! | `chunkq run --resume` | Same, reading chunks from `chunking.chunk_dir` |
//! | `chunkq split` | Write chunk files only |
//! | `chunkq ask` | Send the whole source and the question in one request |
//!
//! Logs go to stderr (`RUST_LOG` overrides the filter). In display mode the
//! JSON result is the only thing written to stdout.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use chunkq::{config, pipeline};

/// chunkq — query a large text through a chat-completion endpoint chunk by
/// chunk and collect the JSON replies.
#[derive(Parser)]
#[command(
    name = "chunkq",
    about = "chunkq — chunked chat-completion queries with JSON aggregation",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/chunkq.toml")]
    config: PathBuf,

    /// Log at debug level (unless RUST_LOG is set).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query every chunk of the source and deliver the aggregated results.
    ///
    /// Output goes to `[output] path` when `persist = true`, otherwise to
    /// stdout. If a request fails the run stops and no output is written.
    Run {
        /// Read chunks from `chunking.chunk_dir` instead of splitting the source.
        #[arg(long)]
        resume: bool,
    },

    /// Split the source into chunk files under `chunking.chunk_dir`.
    Split,

    /// Send the whole source and the question as a single request.
    Ask,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "chunkq=debug" } else { "chunkq=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Run { resume } => {
            pipeline::run_chunked(&cfg, resume).await?;
        }
        Commands::Split => {
            pipeline::run_split(&cfg)?;
        }
        Commands::Ask => {
            pipeline::run_ask(&cfg).await?;
        }
    }

    Ok(())
}
