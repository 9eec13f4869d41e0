//! Semantic-connection graph maintenance and traversal.
//!
//! Each record keeps its `k` most cosine-similar other records. Maintenance
//! runs in two phases so the store can rank under a shared lock and commit
//! under an exclusive one:
//!
//! 1. [`plan_recompute`] ranks every row against one record and derives the
//!    record's new list plus the mutual entries to push into other lists.
//! 2. [`commit_recompute`] applies the plan, resolving rows by id so a record
//!    that vanished in between is skipped.
//!
//! Lists pushed into other records come from the recomputed record's ranking,
//! not from re-ranking each neighbor. A→B does not imply B→A.

use std::collections::{HashSet, VecDeque};

use super::table::VectorTable;
use super::types::{Connection, Record};
use crate::error::Result;

/// Default neighbors per record.
pub const DEFAULT_K: usize = 5;

/// Planned connection changes for one record.
#[derive(Debug, Clone)]
pub struct RecomputePlan {
    pub id: String,
    /// The record's new top-k list.
    pub connections: Vec<Connection>,
    /// Every other ranked record and its similarity to `id`.
    pub mutual: Vec<Connection>,
}

/// Ranking phase: compute the new connection list for `id`.
///
/// Returns `Ok(None)` if `id` is no longer present.
pub fn plan_recompute(table: &VectorTable, id: &str, k: usize) -> Result<Option<RecomputePlan>> {
    let Some(row) = table.position(id) else {
        return Ok(None);
    };
    let query = table.row(row).to_vec();
    let ranked = table.rank(&query, table.len())?;

    let mutual: Vec<Connection> = ranked
        .into_iter()
        .filter(|(other, _)| *other != row)
        .map(|(other, score)| Connection {
            id: table.record(other).id.clone(),
            score,
        })
        .collect();
    let connections = mutual.iter().take(k).cloned().collect();

    Ok(Some(RecomputePlan {
        id: id.to_string(),
        connections,
        mutual,
    }))
}

/// Commit phase: store the planned list and push `(id, score)` into every
/// mutually ranked record's list, re-sorting and truncating to `k`.
///
/// Returns the number of neighbor lists touched.
pub fn commit_recompute(table: &mut VectorTable, plan: RecomputePlan, k: usize) -> usize {
    let Some(row) = table.position(&plan.id) else {
        tracing::debug!(id = %plan.id, "record removed before connections were committed");
        return 0;
    };
    table.record_mut(row).connections = plan.connections;

    let mut touched = 0;
    for entry in plan.mutual {
        let Some(other) = table.position(&entry.id) else {
            continue;
        };
        upsert_connection(
            &mut table.record_mut(other).connections,
            Connection {
                id: plan.id.clone(),
                score: entry.score,
            },
            k,
        );
        touched += 1;
    }
    touched
}

/// Replace or insert the entry for `entry.id`, then keep the list sorted
/// descending by score and at most `k` long.
pub fn upsert_connection(list: &mut Vec<Connection>, entry: Connection, k: usize) {
    list.retain(|c| c.id != entry.id);
    list.push(entry);
    list.sort_by(|a, b| b.score.total_cmp(&a.score));
    list.truncate(k);
}

/// Full rebuild ranking phase: the exact top-k of every record.
pub fn plan_rebuild(table: &VectorTable, k: usize) -> Result<Vec<(String, Vec<Connection>)>> {
    let mut plans = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let query = table.row(row).to_vec();
        let connections = table
            .rank(&query, table.len())?
            .into_iter()
            .filter(|(other, _)| *other != row)
            .take(k)
            .map(|(other, score)| Connection {
                id: table.record(other).id.clone(),
                score,
            })
            .collect();
        plans.push((table.record(row).id.clone(), connections));
    }
    Ok(plans)
}

/// Full rebuild commit phase. Rows are resolved by id.
pub fn commit_rebuild(table: &mut VectorTable, plans: Vec<(String, Vec<Connection>)>) {
    for (id, connections) in plans {
        if let Some(row) = table.position(&id) {
            table.record_mut(row).connections = connections;
        }
    }
}

/// Breadth-first walk of the connection graph from `start`, at most `depth`
/// hops. Each record is visited once; dangling neighbor ids are skipped.
///
/// The caller guarantees `start` exists.
pub fn traverse(table: &VectorTable, start: &str, depth: usize) -> Vec<Record> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    let mut result = Vec::new();

    if let Some(row) = table.position(start) {
        visited.insert(table.record(row).id.as_str());
        queue.push_back((row, 0));
    }

    while let Some((row, hops)) = queue.pop_front() {
        let record = table.record(row);
        result.push(record.clone());
        if hops == depth {
            continue;
        }
        for conn in &record.connections {
            match table.position(&conn.id) {
                Some(next) => {
                    let next_id = table.record(next).id.as_str();
                    if visited.insert(next_id) {
                        queue.push_back((next, hops + 1));
                    }
                }
                None => {
                    tracing::warn!(from = %record.id, to = %conn.id, "dangling connection skipped");
                }
            }
        }
    }

    result
}
