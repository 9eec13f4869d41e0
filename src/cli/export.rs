use anyhow::Result;

use super::Collection;
use crate::config::SemvecConfig;

/// Export the collection as the structured JSON document to stdout.
pub fn export(config: &SemvecConfig, collection: Option<&str>) -> Result<()> {
    let collection = Collection::open(config, collection)?;
    let snapshot = collection.store.snapshot()?;

    let json = serde_json::to_string_pretty(&snapshot)?;
    println!("{json}");

    eprintln!(
        "Exported {} records from '{}'.",
        snapshot.metadata.len(),
        collection.name
    );

    Ok(())
}
