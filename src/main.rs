//! ReviewLens: hybrid retrieval over a review corpus with LLM relevance evaluation

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use reviewlens::{
    config::{Config, LogFormat, LoggingConfig},
    types::RetrievalMode,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "reviewlens")]
#[command(about = "Hybrid lexical + semantic search over reviews, judged by an LLM")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Where to write the configuration
        #[arg(default_value = "config.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Build the lexical and vector indexes from the corpus
    Index {
        /// Rebuild even if indexes already exist
        #[arg(long)]
        force: bool,
    },

    /// Search the corpus with each retrieval mode
    Search {
        /// Query string
        #[arg(short, long)]
        query: String,

        /// Number of results per mode
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Only search with this mode (lexical, semantic, hybrid)
        #[arg(short, long)]
        mode: Option<RetrievalMode>,

        /// Output format (text, json, json-pretty)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Retrieve and judge results for a file of queries
    Evaluate {
        /// File with one query per line
        #[arg(short, long)]
        queries: PathBuf,

        /// Modes to evaluate (repeatable; all modes by default)
        #[arg(short, long)]
        mode: Vec<RetrievalMode>,

        /// Directory for search_<mode>.json files (defaults to output.results_dir)
        #[arg(long)]
        results_dir: Option<PathBuf>,
    },

    /// Show average relevance scores per mode
    Report {
        /// Directory holding search_<mode>.json files (defaults to output.results_dir)
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn init_logging(logging: &LoggingConfig, verbose: u8) -> Result<()> {
    let level = logging.level.with_verbosity(verbose);
    // RUST_LOG, when set, overrides the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        Ok(Config::default())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Init writes the config, so it must not require one
        Commands::Init { path, force } => {
            init_logging(&LoggingConfig::default(), cli.verbose)?;
            commands::init_config(path, force).await
        }
        command => {
            let config = load_config(&cli.config)?;
            init_logging(&config.logging, cli.verbose)?;
            if !cli.config.exists() {
                info!("No config at {}, using defaults", cli.config.display());
            }
            run(command, config).await
        }
    }
}

async fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Init { path, force } => commands::init_config(path, force).await,
        Commands::Index { force } => commands::build_indexes(config, force).await,
        Commands::Search {
            query,
            top_k,
            mode,
            format,
        } => commands::search_corpus(config, query, top_k, mode, format).await,
        Commands::Evaluate {
            queries,
            mode,
            results_dir,
        } => commands::run_evaluation(config, queries, mode, results_dir).await,
        Commands::Report { results_dir, format } => {
            let results_dir = results_dir.unwrap_or_else(|| config.output.results_dir.clone());
            commands::show_report(results_dir, format).await
        }
    }
}
