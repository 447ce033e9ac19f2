//! nbtrust CLI - sign, check and filter Jupyter notebooks against the trust database.

use clap::{Args, Parser, Subcommand};
use nbtrust_core::{DigestAlg, StoreOptions, TrustConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{digest, secret, store, trust};

#[derive(Parser)]
#[command(name = "nbtrust")]
#[command(version, about = "Jupyter notebook trust: sign, check and filter notebooks")]
struct Cli {
    #[command(flatten)]
    trust: TrustArgs,
    #[command(subcommand)]
    command: Commands,
}

// Options shared by every command.
#[derive(Args)]
struct TrustArgs {
    /// Jupyter data directory (default: JUPYTER_DATA_DIR or the platform location)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Signature database (default: <data-dir>/nbsignatures.db)
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    /// HMAC algorithm: sha224, sha256, sha384 or sha512
    #[arg(long, global = true, default_value = "sha256")]
    algorithm: DigestAlg,
    /// Maximum number of signatures kept (default: 65535)
    #[arg(long, global = true)]
    cache_size: Option<usize>,
    /// Open the database without write access
    #[arg(long, global = true)]
    readonly: bool,
    /// Create the database and secret if missing
    #[arg(long, global = true)]
    create: bool,
    /// Never cull automatically when the database is full
    #[arg(long, global = true)]
    no_cull: bool,
    /// Output as JSON lines
    #[arg(long, global = true)]
    json: bool,
}

impl TrustArgs {
    fn config(&self) -> TrustConfig {
        let defaults = StoreOptions::default();
        TrustConfig {
            data_dir: self.data_dir.clone(),
            database: self.database.clone(),
            secret: None,
            algorithm: self.algorithm,
            store: StoreOptions {
                readonly: self.readonly,
                create: self.create,
                cull: !self.no_cull,
                cache_size: self.cache_size.unwrap_or(defaults.cache_size),
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Mark notebooks as trusted
    Sign {
        /// Notebook files
        #[arg(required = true)]
        notebooks: Vec<PathBuf>,
    },
    /// Report whether notebooks are trusted (exit code 1 if any is not)
    Check {
        /// Notebook files
        #[arg(required = true)]
        notebooks: Vec<PathBuf>,
    },
    /// Revoke trust in notebooks
    Unsign {
        /// Notebook files
        #[arg(required = true)]
        notebooks: Vec<PathBuf>,
    },
    /// Print only the trusted notebooks, in the order given
    Filter {
        /// Notebook files
        notebooks: Vec<PathBuf>,
    },
    /// Print the signature of a notebook
    Digest {
        /// Notebook file (or stdin if not provided)
        input: Option<PathBuf>,
    },
    /// Show the canonical text a signature is computed over
    Canonicalize {
        /// Input JSON file (or stdin if not provided)
        input: Option<PathBuf>,
        /// Print one JSON-quoted token per line instead of the concatenation
        #[arg(long)]
        tokens: bool,
    },
    /// Print the number of stored signatures
    Count,
    /// Drop the least recently seen signatures down to 75% of the cache size
    Cull,
    /// Create the notebook secret if missing and print its location
    Secret,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.trust.config();
    let json = cli.trust.json;

    match cli.command {
        Commands::Sign { notebooks } => trust::sign(&config, notebooks, json).await,
        Commands::Check { notebooks } => trust::check(&config, notebooks, json).await,
        Commands::Unsign { notebooks } => trust::unsign(&config, notebooks, json).await,
        Commands::Filter { notebooks } => trust::filter(&config, notebooks, json).await,
        Commands::Digest { input } => digest::digest(&config, input).await,
        Commands::Canonicalize { input, tokens } => digest::canonicalize(input, tokens),
        Commands::Count => store::count(&config).await,
        Commands::Cull => store::cull(&config).await,
        Commands::Secret => secret::run(&config).await,
    }
}
