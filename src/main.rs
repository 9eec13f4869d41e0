mod cli;
mod config;
mod embedding;
mod error;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "semvec", version, about = "Embedded vector store with a semantic-connection graph")]
struct Cli {
    /// Collection to operate on (defaults to storage.default_collection)
    #[arg(long, global = true)]
    collection: Option<String>,

    /// Config file (defaults to ~/.semvec/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import records from a JSON array of {text, embedding, metadata}
    Import { file: PathBuf },
    /// Exact top-N cosine search
    Search {
        /// Query vector as a JSON array
        #[arg(long)]
        vector: String,
        #[arg(long)]
        top: Option<usize>,
    },
    /// Top-K search expanded through the connection graph
    Semantic {
        #[arg(long)]
        vector: String,
        #[arg(long)]
        top: Option<usize>,
        #[arg(long)]
        depth: Option<usize>,
    },
    /// List records reachable from a record through its connections
    Connected {
        id: String,
        #[arg(long)]
        depth: Option<usize>,
    },
    /// Show one record in full
    Inspect { id: String },
    /// Replace a record's embedding and/or merge metadata
    Update {
        id: String,
        #[arg(long)]
        vector: Option<String>,
        /// Metadata keys to merge, as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Delete a record
    Delete { id: String },
    /// Recompute every connection list from scratch
    Rebuild,
    /// Show collection statistics
    Stats,
    /// Print the collection as JSON
    Export,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::SemvecConfig::load_from(path)?,
        None => config::SemvecConfig::load()?,
    };

    // Log to stderr so stdout stays clean for command output.
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let collection = cli.collection.as_deref();
    match cli.command {
        Command::Import { file } => cli::import::import(&config, collection, &file)?,
        Command::Search { vector, top } => cli::search::search(&config, collection, &vector, top)?,
        Command::Semantic { vector, top, depth } => {
            cli::search::semantic(&config, collection, &vector, top, depth)?
        }
        Command::Connected { id, depth } => {
            cli::inspect::connected(&config, collection, &id, depth)?
        }
        Command::Inspect { id } => cli::inspect::inspect(&config, collection, &id)?,
        Command::Update {
            id,
            vector,
            metadata,
        } => cli::modify::update(
            &config,
            collection,
            &id,
            vector.as_deref(),
            metadata.as_deref(),
        )?,
        Command::Delete { id } => cli::modify::delete(&config, collection, &id)?,
        Command::Rebuild => cli::modify::rebuild(&config, collection)?,
        Command::Stats => cli::stats::stats(&config, collection)?,
        Command::Export => cli::export::export(&config, collection)?,
    }

    Ok(())
}
