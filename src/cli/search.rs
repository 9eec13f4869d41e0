use anyhow::Result;

use super::{parse_vector, preview, Collection};
use crate::config::SemvecConfig;

/// Exact top-N similarity search from the terminal.
pub fn search(
    config: &SemvecConfig,
    collection: Option<&str>,
    vector: &str,
    top: Option<usize>,
) -> Result<()> {
    let query = parse_vector(vector)?;
    let collection = Collection::open(config, collection)?;
    let top = top.unwrap_or(config.search.top_k);

    let hits = collection.store.top_cosine_similarity(&query, top)?;

    if hits.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} result(s)\n", hits.len());
    for (i, hit) in hits.iter().enumerate() {
        println!(
            "  {}. {} (similarity: {:.4})",
            i + 1,
            hit.record.id,
            hit.similarity
        );
        println!("     {}", preview(&hit.record.chunk_text, 120));
        println!();
    }

    Ok(())
}

/// Similarity search expanded through the connection graph.
pub fn semantic(
    config: &SemvecConfig,
    collection: Option<&str>,
    vector: &str,
    top: Option<usize>,
    depth: Option<usize>,
) -> Result<()> {
    let query = parse_vector(vector)?;
    let collection = Collection::open(config, collection)?;
    let top = top.unwrap_or(config.search.top_k);
    let depth = depth.unwrap_or(config.search.depth);

    let records = collection.store.semantic_search(&query, top, depth)?;

    if records.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} record(s) (top {top}, depth {depth})\n", records.len());
    for record in &records {
        println!("  {} ({} connections)", record.id, record.connections.len());
        println!("     {}", preview(&record.chunk_text, 120));
    }

    Ok(())
}
