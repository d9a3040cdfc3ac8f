//! # Flowdex CLI (`fdx`)
//!
//! The `fdx` binary is the primary interface for Flowdex. It provides
//! commands for database initialization, corpus indexing, search, record
//! retrieval, statistics, and starting the HTTP API server.
//!
//! ## Usage
//!
//! ```bash
//! fdx --config ./config/fdx.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fdx init` | Create the SQLite database and run schema migrations |
//! | `fdx index` | Run one indexing pass over the workflow corpus |
//! | `fdx search "<query>"` | Search indexed workflows |
//! | `fdx get <filename>` | Retrieve a record plus its raw workflow JSON |
//! | `fdx stats` | Print aggregate catalog statistics |
//! | `fdx categories` | List the static service categories |
//! | `fdx serve` | Start the JSON HTTP API server |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the database
//! fdx init --config ./config/fdx.toml
//!
//! # Index the corpus (only changed files are re-processed)
//! fdx index --config ./config/fdx.toml
//!
//! # Re-extract everything regardless of stored fingerprints
//! fdx index --force --config ./config/fdx.toml
//!
//! # Filtered search
//! fdx search "slack" --trigger Webhook --active-only
//!
//! # Start the API server
//! fdx serve --config ./config/fdx.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use flowdex::{catalog, config, db, get, indexer, migrate, search, server, stats};

/// Flowdex CLI — a catalog and full-text search engine for n8n workflow
/// exports.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/fdx.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "fdx",
    about = "Flowdex — a catalog and full-text search engine for n8n workflow exports",
    version,
    long_about = "Flowdex scans a directory of n8n workflow JSON exports, extracts browsable \
    metadata from each node graph (trigger type, integrations, complexity, a generated \
    description), and serves filterable full-text search over a CLI and a JSON HTTP API."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/fdx.toml`. Corpus, database, and server
    /// settings are read from this file.
    #[arg(long, global = true, default_value = "./config/fdx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file, the workflows table, the FTS5
    /// index, and auxiliary indexes. This command is idempotent — running
    /// it multiple times is safe.
    Init,

    /// Run one indexing pass over the workflow corpus.
    ///
    /// Unchanged files (matching stored content fingerprints) are skipped;
    /// per-file failures are counted and never abort the pass.
    Index {
        /// Re-extract every file regardless of stored fingerprints.
        #[arg(long)]
        force: bool,
    },

    /// Search indexed workflows.
    ///
    /// Free text is matched against filename, name, description,
    /// integrations, and tags, ranked by relevance.
    Search {
        /// The search query string.
        query: String,

        /// Filter by trigger type: `all`, `Manual`, `Webhook`, `Scheduled`, or `Complex`.
        #[arg(long, default_value = "all")]
        trigger: String,

        /// Filter by complexity tier: `all`, `low`, `medium`, or `high`.
        #[arg(long, default_value = "all")]
        complexity: String,

        /// Only return active workflows.
        #[arg(long)]
        active_only: bool,

        /// Maximum number of results to return.
        #[arg(long, default_value_t = 20)]
        limit: i64,

        /// Number of results to skip (for pagination).
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },

    /// Retrieve a record by its corpus filename.
    ///
    /// Prints the stored metadata and the raw workflow JSON.
    Get {
        /// Workflow filename (relative to the corpus root).
        filename: String,
    },

    /// Print aggregate catalog statistics.
    Stats,

    /// List the static service categories.
    Categories {
        /// Also list the services inside each category.
        #[arg(long)]
        services: bool,
    },

    /// Start the JSON HTTP API server.
    ///
    /// Binds to the address configured in `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Categories come from a static table and need no config
    if let Commands::Categories { services } = &cli.command {
        catalog::run_categories(*services);
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg).await?;
            migrate::run_migrations(&pool).await?;
            pool.close().await;
            println!("Database initialized successfully.");
        }
        Commands::Index { force } => {
            indexer::run_index(&cfg, force).await?;
        }
        Commands::Search {
            query,
            trigger,
            complexity,
            active_only,
            limit,
            offset,
        } => {
            search::run_search(&cfg, &query, &trigger, &complexity, active_only, limit, offset)
                .await?;
        }
        Commands::Get { filename } => {
            get::run_get(&cfg, &filename).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Categories { .. } => unreachable!(),
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
