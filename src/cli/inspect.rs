//! CLI `inspect` and `connected` commands.

use anyhow::Result;

use super::{preview, Collection};
use crate::config::SemvecConfig;

/// Inspect a single record by ID and display full details.
pub fn inspect(config: &SemvecConfig, collection: Option<&str>, id: &str) -> Result<()> {
    let collection = Collection::open(config, collection)?;
    let record = collection.store.get(id)?;
    let embedding = collection.store.embedding(id)?;

    println!("Record: {}", record.id);
    println!("{}", "=".repeat(50));
    println!("  Dimension:      {}", embedding.len());
    if !record.metadata.is_empty() {
        println!(
            "  Metadata:       {}",
            serde_json::to_string_pretty(&record.metadata)?
        );
    }
    println!();
    println!("Text:");
    println!("  {}", record.chunk_text);

    if !record.connections.is_empty() {
        println!();
        println!("Connections:");
        for conn in &record.connections {
            println!("  --[{:.4}]--> {}", conn.score, conn.id);
        }
    }

    Ok(())
}

/// Walk the connection graph from a record.
pub fn connected(
    config: &SemvecConfig,
    collection: Option<&str>,
    id: &str,
    depth: Option<usize>,
) -> Result<()> {
    let collection = Collection::open(config, collection)?;
    let depth = depth.unwrap_or(config.search.depth);
    let records = collection.store.connected_chunks(id, depth)?;

    println!("{} record(s) within {depth} hop(s) of {id}\n", records.len());
    for record in &records {
        println!("  {}  {}", record.id, preview(&record.chunk_text, 80));
    }

    Ok(())
}
