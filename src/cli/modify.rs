//! CLI commands that mutate a collection: `update`, `delete`, `rebuild`.

use anyhow::{bail, Result};

use super::{parse_metadata, parse_vector, Collection};
use crate::config::SemvecConfig;

/// Replace a record's embedding and/or merge metadata keys.
pub fn update(
    config: &SemvecConfig,
    collection: Option<&str>,
    id: &str,
    vector: Option<&str>,
    metadata: Option<&str>,
) -> Result<()> {
    if vector.is_none() && metadata.is_none() {
        bail!("nothing to update: pass --vector and/or --metadata");
    }
    let embedding = vector.map(parse_vector).transpose()?;
    let metadata = metadata.map(parse_metadata).transpose()?;

    let collection = Collection::open(config, collection)?;
    let result = collection
        .store
        .update(id, embedding, metadata, config.search.normalize)?;
    collection.save()?;

    println!("Updated {}", result.id);
    if result.embedding_changed {
        println!("  Embedding replaced");
    }
    if result.zero_vector {
        println!("  Warning: zero vector stored unnormalized");
    }
    Ok(())
}

/// Delete a record. With connections enabled the graph is rebuilt.
pub fn delete(config: &SemvecConfig, collection: Option<&str>, id: &str) -> Result<()> {
    let collection = Collection::open(config, collection)?;
    let removed = collection.store.delete(id)?;
    collection.save()?;

    println!("Deleted {}", removed.id);
    println!("  Remaining records: {}", collection.store.len()?);
    Ok(())
}

/// Recompute every connection list from scratch.
pub fn rebuild(config: &SemvecConfig, collection: Option<&str>) -> Result<()> {
    let collection = Collection::open(config, collection)?;
    collection.store.rebuild_connections()?;
    collection.save()?;

    let stats = collection.store.stats()?;
    println!(
        "Rebuilt connections for {} records ({} edges)",
        stats.records, stats.edges
    );
    Ok(())
}
