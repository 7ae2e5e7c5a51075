//! # CodeRAG CLI
//!
//! ```bash
//! # Build or refresh the indexes of the current directory
//! coderag index
//!
//! # Rebuild everything, ignoring change detection
//! coderag index --force --root ~/src/project
//!
//! # Would the next run rebuild? (machine readable)
//! coderag status --json
//! ```
//!
//! Settings come from `coderag.toml` in the corpus root (or `--config`);
//! flags override file values.

mod command;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coderag")]
#[command(about = "Maintain lexical, vector and graph indexes over a source tree")]
#[command(version)]
struct Cli {
    /// Config file (default: <root>/coderag.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Corpus root, overrides `corpus_root` from the config file
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Print the report as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the indexes if the corpus or any artifact changed
    Index {
        /// Rebuild everything, skipping change detection
        #[arg(short, long)]
        force: bool,

        /// Embedding server URL, overrides `embedding_server_url`
        #[arg(long)]
        embedding_server: Option<String>,

        /// Chunks per embedding request
        #[arg(long)]
        batch_size: Option<usize>,

        /// Worker bound for the graph build
        #[arg(long)]
        parallelism: Option<usize>,
    },

    /// Report whether the next `index` run would rebuild, without writing
    Status,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = command::load_config(cli.config.as_deref(), cli.root.as_deref())?;

    match cli.command {
        Commands::Index {
            force,
            embedding_server,
            batch_size,
            parallelism,
        } => {
            config.force_full_rebuild |= force;
            if let Some(url) = embedding_server {
                config.embedding_server_url = Some(url);
            }
            if let Some(size) = batch_size {
                config.embedding_batch_size = size;
            }
            if let Some(workers) = parallelism {
                config.max_degree_of_parallelism = workers;
            }
            command::index(config, cli.json).await
        }
        Commands::Status => command::status(config, cli.json),
    }
}
