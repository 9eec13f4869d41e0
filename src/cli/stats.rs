use anyhow::Result;

use super::Collection;
use crate::config::SemvecConfig;

/// Display collection statistics in the terminal.
pub fn stats(config: &SemvecConfig, collection: Option<&str>) -> Result<()> {
    let collection = Collection::open(config, collection)?;
    let stats = collection.store.stats()?;

    println!("Collection '{}'", collection.name);
    println!("{}", "=".repeat(40));
    println!("  Records:             {}", stats.records);
    match stats.dimension {
        Some(d) => println!("  Dimension:           {d}"),
        None => println!("  Dimension:           (not established)"),
    }
    println!();

    println!("Connections:");
    if !stats.connections_enabled {
        println!("  disabled");
        return Ok(());
    }
    println!("  k:                   {}", stats.k);
    println!("  Edges:               {}", stats.edges);
    println!("  Average degree:      {:.2}", stats.average_degree());
    println!("  One-way edges:       {}", stats.asymmetric_edges);
    if stats.dangling_edges > 0 {
        println!("  Dangling edges:      {}", stats.dangling_edges);
    }

    Ok(())
}
