#![allow(dead_code)]

use semvec::store::types::{Metadata, MetadataValue, NewRecord};
use semvec::store::{StoreOptions, VectorStore};

pub const DIM: usize = 16;

/// Fresh store with connection maintenance on.
pub fn connected_store(k: usize) -> VectorStore {
    VectorStore::new(StoreOptions::with_connections(k))
}

/// Fresh store with connection maintenance off.
pub fn plain_store() -> VectorStore {
    VectorStore::new(StoreOptions::default())
}

/// Deterministic `DIM`-dim embedding with a spike at `seed` and a small
/// shared component so every pair has a positive, distinct similarity.
pub fn test_embedding(seed: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; DIM];
    v[seed % DIM] = 1.0;
    v[(seed + 1) % DIM] = 0.1 * ((seed % 7) as f32 + 1.0);
    v
}

/// Pseudo-random vector from a simple LCG, reproducible per seed.
pub fn noise_embedding(seed: u64) -> Vec<f32> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..DIM)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 33) as f32 / (1u64 << 31) as f32) - 0.5
        })
        .collect()
}

pub fn metadata(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), MetadataValue::from(*v)))
        .collect()
}

/// Insert a record and return its ID.
pub fn insert(store: &VectorStore, text: &str, embedding: &[f32]) -> String {
    store
        .add(text, embedding.to_vec(), Metadata::new(), false)
        .unwrap()
        .id
}

pub fn new_records(seeds: impl IntoIterator<Item = u64>) -> Vec<NewRecord> {
    seeds
        .into_iter()
        .map(|s| NewRecord::new(format!("chunk {s}"), noise_embedding(s)))
        .collect()
}

/// Assert every connection list is at most `k` long, sorted descending,
/// free of self-links and duplicates.
pub fn assert_connection_invariants(store: &VectorStore, k: usize) {
    let snapshot = store.snapshot().unwrap();
    for record in &snapshot.metadata {
        let conns = &record.connections;
        assert!(conns.len() <= k, "{} has {} connections", record.id, conns.len());
        for pair in conns.windows(2) {
            assert!(pair[0].score >= pair[1].score, "connections out of order");
        }
        assert!(conns.iter().all(|c| c.id != record.id), "self-link");
        let mut ids: Vec<&str> = conns.iter().map(|c| c.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), conns.len(), "duplicate connection");
    }
}
