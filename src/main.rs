//! Binary entry point for factsieve.
//!
//! This binary provides the CLI interface for building a vector store from
//! text files and querying it with near-duplicate filtering.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use factsieve::cli::{
    IndexArgs, OutputFormat, QueryArgs, SimilarArgs, cmd_index, cmd_query, cmd_query_async,
    cmd_similar,
};
use factsieve::config::SieveConfig;
use factsieve::embedding::build_embedder;
use factsieve::observability::{self, LoggingConfig};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Factsieve - diversity-aware retrieval with near-duplicate filtering.
#[derive(Parser)]
#[command(name = "factsieve")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "FACTSIEVE_CONFIG_PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Chunk, embed and add a text file to the store.
    Index {
        /// Text file to index.
        file: PathBuf,

        /// Store file (defaults to the configured store path).
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Maximum chunk size in characters.
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Characters shared between neighbouring chunks.
        #[arg(long)]
        chunk_overlap: Option<usize>,
    },

    /// Retrieve diverse, non-redundant documents for a question.
    Query {
        /// The question.
        question: String,

        /// Store file (defaults to the configured store path).
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Similarity at which a candidate counts as redundant (0.0-1.0).
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Maximum number of documents to return.
        #[arg(short, long)]
        k: Option<usize>,

        /// Candidates fetched before MMR ranking.
        #[arg(long)]
        fetch_k: Option<usize>,

        /// MMR trade-off: 1.0 favours relevance, 0.0 diversity.
        #[arg(long)]
        lambda: Option<f32>,

        /// Use the suspending retrieval path.
        #[arg(long = "async")]
        use_async: bool,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Plain similarity search with scores (no MMR, no filtering).
    Similar {
        /// The question.
        question: String,

        /// Store file (defaults to the configured store path).
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Number of results.
        #[arg(short, long)]
        k: Option<usize>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        },
    };

    let logging = LoggingConfig::from_settings(&config.logging, cli.verbose);
    if let Err(e) = observability::init_logging(&logging) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, config: &SieveConfig) -> anyhow::Result<()> {
    let embedder = build_embedder(&config.embedding).context("building embedding provider")?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Index {
            file,
            store,
            chunk_size,
            chunk_overlap,
        } => {
            let args = IndexArgs {
                file,
                store,
                chunk_size,
                chunk_overlap,
            };
            cmd_index(config, &args, embedder, &mut out)?;
        },

        Commands::Query {
            question,
            store,
            threshold,
            k,
            fetch_k,
            lambda,
            use_async,
            json,
        } => {
            let args = QueryArgs {
                question,
                store,
                threshold,
                k,
                fetch_k,
                lambda_mult: lambda,
                format: OutputFormat::from_flag(json),
            };
            if use_async {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .context("starting async runtime")?;
                runtime.block_on(cmd_query_async(config, &args, embedder, &mut out))?;
            } else {
                cmd_query(config, &args, embedder, &mut out)?;
            }
        },

        Commands::Similar {
            question,
            store,
            k,
            json,
        } => {
            let args = SimilarArgs {
                question,
                store,
                k,
                format: OutputFormat::from_flag(json),
            };
            cmd_similar(config, &args, embedder, &mut out)?;
        },
    }

    out.flush().context("flushing output")?;
    Ok(())
}

/// Loads configuration from an explicit path or the default locations.
fn load_config(path: Option<&Path>) -> anyhow::Result<SieveConfig> {
    match path {
        Some(path) => SieveConfig::load_from_file(path)
            .with_context(|| format!("reading {}", path.display())),
        None => Ok(SieveConfig::load_default()),
    }
}
