use anyhow::{Context, Result};
use std::path::Path;

use super::Collection;
use crate::config::SemvecConfig;
use crate::store::types::NewRecord;

/// Import records from a JSON file.
///
/// The file holds an array of `{"text": ..., "embedding": [...], "metadata": {...}}`
/// objects. All records go in as one batch; the collection is saved afterwards.
pub fn import(config: &SemvecConfig, collection: Option<&str>, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let records: Vec<NewRecord> =
        serde_json::from_str(&json).context("failed to parse import JSON")?;

    let collection = Collection::open(config, collection)?;
    let before = collection.store.len()?;

    println!("Importing {} records into '{}'...", records.len(), collection.name);

    let results = collection
        .store
        .add_batch(records, config.search.normalize)
        .context("import failed")?;
    collection.save()?;

    let zero = results.iter().filter(|r| r.zero_vector).count();

    println!("Import complete:");
    println!("  Records imported: {}", results.len());
    println!("  Collection size:  {} (was {before})", collection.store.len()?);
    if zero > 0 {
        println!("  Zero vectors:     {zero} (stored unnormalized)");
    }

    Ok(())
}
