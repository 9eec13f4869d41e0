//! Table statistics: record count, dimension, and connection-graph shape.

use serde::Serialize;
use std::collections::HashSet;

use super::table::VectorTable;

#[derive(Debug, Clone, Serialize)]
pub struct TableStats {
    pub records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
    pub connections_enabled: bool,
    pub k: usize,
    /// Total directed edges across all connection lists.
    pub edges: usize,
    /// Edges A→B where B does not link back to A.
    pub asymmetric_edges: usize,
    /// Edges pointing at ids no longer in the table.
    pub dangling_edges: usize,
}

impl TableStats {
    pub fn average_degree(&self) -> f64 {
        if self.records == 0 {
            0.0
        } else {
            self.edges as f64 / self.records as f64
        }
    }
}

pub fn table_stats(table: &VectorTable, connections_enabled: bool, k: usize) -> TableStats {
    let edge_set: HashSet<(&str, &str)> = table
        .records()
        .iter()
        .flat_map(|r| r.connections.iter().map(move |c| (r.id.as_str(), c.id.as_str())))
        .collect();

    let mut edges = 0;
    let mut asymmetric_edges = 0;
    let mut dangling_edges = 0;
    for record in table.records() {
        for conn in &record.connections {
            edges += 1;
            if table.position(&conn.id).is_none() {
                dangling_edges += 1;
            } else if !edge_set.contains(&(conn.id.as_str(), record.id.as_str())) {
                asymmetric_edges += 1;
            }
        }
    }

    TableStats {
        records: table.len(),
        dimension: table.dimension(),
        connections_enabled,
        k,
        edges,
        asymmetric_edges,
        dangling_edges,
    }
}
