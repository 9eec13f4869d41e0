//! The vector store: a lock-guarded [`VectorTable`] plus optional
//! semantic-connection maintenance.
//!
//! Mutations (`add`, `add_batch`, `update`, `delete`, connection commits) take
//! the write lock; searches, traversal, and `save` take the read lock.
//!
//! Connection recompute ranks under the read lock and commits under the write
//! lock, releasing in between. Under concurrent writers a connection list may
//! reflect a record set that has since changed. The matrix and record array
//! always stay consistent with each other; only graph freshness can lag.
//!
//! `add_batch` and `delete` (which rebuilds every list) cost `O(rows² × D)`
//! with maintenance on. Keep tables modest when using either.

pub mod graph;
pub mod persist;
pub mod similarity;
pub mod stats;
pub mod table;
pub mod types;

use std::collections::HashSet;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::embedding::EmbeddingProvider;
use crate::error::{Result, StoreError};
use persist::{Format, Snapshot, StorageMedium};
use stats::TableStats;
use table::VectorTable;
use types::{
    merge_metadata, AddResult, Metadata, NewRecord, Record, SimilarityResult, UpdateResult,
};

/// Store construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Maintain per-record connection lists.
    pub connections: bool,
    /// Neighbors kept per record.
    pub k: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            connections: false,
            k: graph::DEFAULT_K,
        }
    }
}

impl StoreOptions {
    pub fn with_connections(k: usize) -> Self {
        Self {
            connections: true,
            k,
        }
    }
}

pub struct VectorStore {
    table: RwLock<VectorTable>,
    options: StoreOptions,
}

impl VectorStore {
    /// A `k` of zero is raised to 1.
    pub fn new(options: StoreOptions) -> Self {
        let mut options = options;
        if options.k == 0 {
            tracing::warn!(connections = options.connections, "k = 0 raised to 1");
            options.k = 1;
        }
        Self {
            table: RwLock::new(VectorTable::new()),
            options,
        }
    }

    /// Open a store from a snapshot file.
    pub fn open(path: impl AsRef<Path>, format: Format, options: StoreOptions) -> Result<Self> {
        let store = Self::new(options);
        store.load(path, format)?;
        Ok(store)
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, VectorTable>> {
        Ok(self.table.read()?)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, VectorTable>> {
        Ok(self.table.write()?)
    }

    fn require_connections(&self) -> Result<()> {
        if self.options.connections {
            Ok(())
        } else {
            Err(StoreError::Disabled)
        }
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    pub fn dimension(&self) -> Result<Option<usize>> {
        Ok(self.read()?.dimension())
    }

    /// All record ids in row order.
    pub fn ids(&self) -> Result<Vec<String>> {
        Ok(self.read()?.records().iter().map(|r| r.id.clone()).collect())
    }

    pub fn get(&self, id: &str) -> Result<Record> {
        let table = self.read()?;
        let row = table.require(id)?;
        Ok(table.record(row).clone())
    }

    /// Stored embedding for `id`.
    pub fn embedding(&self, id: &str) -> Result<Vec<f32>> {
        let table = self.read()?;
        let row = table.require(id)?;
        Ok(table.row(row).to_vec())
    }

    /// Copy of the full table contents.
    pub fn snapshot(&self) -> Result<Snapshot> {
        let table = self.read()?;
        Ok(Snapshot::capture(&table))
    }

    pub fn stats(&self) -> Result<TableStats> {
        let table = self.read()?;
        Ok(stats::table_stats(
            &table,
            self.options.connections,
            self.options.k,
        ))
    }

    // ── Mutations ─────────────────────────────────────────────────────────────

    /// Insert one record. The first insert fixes the table's dimension.
    pub fn add(
        &self,
        text: &str,
        embedding: Vec<f32>,
        metadata: Metadata,
        normalize: bool,
    ) -> Result<AddResult> {
        let mut embedding = embedding;
        let zero_vector = prepare_embedding(&mut embedding, normalize)?;

        let record = Record::new(text, metadata);
        let id = record.id.clone();
        let rows = {
            let mut table = self.write()?;
            table.push(&embedding, record)?;
            table.len()
        };
        tracing::info!(id = %id, rows, dimension = embedding.len(), "record added");

        if self.options.connections && rows > 1 {
            self.recompute(&id)?;
        }

        Ok(AddResult { id, zero_vector })
    }

    /// Insert several records. Every embedding is checked against the table
    /// dimension before any is stored, so a mismatch leaves the table as it was.
    /// Connections are recomputed once per new record after all are inserted.
    pub fn add_batch(&self, records: Vec<NewRecord>, normalize: bool) -> Result<Vec<AddResult>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut prepared = Vec::with_capacity(records.len());
        for mut new in records {
            let zero_vector = prepare_embedding(&mut new.embedding, normalize)?;
            prepared.push((new, zero_vector));
        }

        let mut results = Vec::with_capacity(prepared.len());
        {
            let mut table = self.write()?;
            let expected = table
                .dimension()
                .unwrap_or_else(|| prepared[0].0.embedding.len());
            for (new, _) in &prepared {
                if new.embedding.len() != expected {
                    return Err(StoreError::DimensionMismatch {
                        expected,
                        actual: new.embedding.len(),
                    });
                }
            }
            for (new, zero_vector) in prepared {
                let record = Record::new(new.text, new.metadata);
                let id = record.id.clone();
                table.push(&new.embedding, record)?;
                results.push(AddResult { id, zero_vector });
            }
            tracing::info!(added = results.len(), rows = table.len(), "batch added");
        }

        if self.options.connections {
            for result in &results {
                self.recompute(&result.id)?;
            }
        }

        Ok(results)
    }

    /// Replace a record's embedding and/or merge new metadata keys into it.
    pub fn update(
        &self,
        id: &str,
        embedding: Option<Vec<f32>>,
        metadata: Option<Metadata>,
        normalize: bool,
    ) -> Result<UpdateResult> {
        let mut embedding = embedding;
        let zero_vector = match embedding.as_mut() {
            Some(e) => prepare_embedding(e, normalize)?,
            None => false,
        };

        {
            let mut table = self.write()?;
            let row = table.require(id)?;
            if let Some(e) = &embedding {
                table.replace_row(row, e)?;
            }
            if let Some(update) = metadata {
                merge_metadata(&mut table.record_mut(row).metadata, update);
            }
        }

        let embedding_changed = embedding.is_some();
        tracing::info!(id = %id, embedding_changed, "record updated");

        if embedding_changed && self.options.connections {
            self.recompute(id)?;
        }

        Ok(UpdateResult {
            id: id.to_string(),
            embedding_changed,
            zero_vector,
        })
    }

    /// Remove a record, compacting the table. With maintenance on, every
    /// remaining record's connections are rebuilt.
    pub fn delete(&self, id: &str) -> Result<Record> {
        let (removed, rows) = {
            let mut table = self.write()?;
            let row = table.require(id)?;
            let removed = table.remove(row);
            (removed, table.len())
        };
        tracing::info!(id = %id, rows, "record deleted");

        if self.options.connections {
            self.rebuild()?;
        }

        Ok(removed)
    }

    /// Recompute every record's connections from scratch.
    pub fn rebuild_connections(&self) -> Result<()> {
        self.require_connections()?;
        self.rebuild()
    }

    // ── Search ────────────────────────────────────────────────────────────────

    /// Exact top-N cosine search. Zero-norm rows are skipped; ties keep row order.
    pub fn top_cosine_similarity(&self, query: &[f32], top_n: usize) -> Result<Vec<SimilarityResult>> {
        let table = self.read()?;
        let ranked = table.rank(query, top_n)?;
        tracing::debug!(top_n, hits = ranked.len(), rows = table.len(), "similarity search");
        Ok(ranked
            .into_iter()
            .map(|(row, similarity)| SimilarityResult {
                record: table.record(row).clone(),
                similarity,
            })
            .collect())
    }

    /// Records reachable from `id` within `depth` hops (0 = just `id`).
    pub fn connected_chunks(&self, id: &str, depth: usize) -> Result<Vec<Record>> {
        self.require_connections()?;
        let table = self.read()?;
        table.require(id)?;
        Ok(graph::traverse(&table, id, depth))
    }

    /// Top-K seeds by similarity, unioned with each seed's graph neighborhood
    /// up to `depth` hops. Seeds come first in similarity order, then the
    /// expansion in discovery order; each id appears once.
    pub fn semantic_search(&self, query: &[f32], top_k: usize, depth: usize) -> Result<Vec<Record>> {
        self.require_connections()?;
        let table = self.read()?;
        let seeds = table.rank(query, top_k)?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut results = Vec::new();
        for (row, _) in &seeds {
            let record = table.record(*row);
            seen.insert(record.id.clone());
            results.push(record.clone());
        }
        for (row, _) in &seeds {
            let seed_id = &table.record(*row).id;
            for record in graph::traverse(&table, seed_id, depth) {
                if seen.insert(record.id.clone()) {
                    results.push(record);
                }
            }
        }

        tracing::debug!(
            top_k,
            depth,
            seeds = seeds.len(),
            results = results.len(),
            "semantic search"
        );
        Ok(results)
    }

    // ── Embedding producer helpers ────────────────────────────────────────────

    /// Embed `text` with `provider` and insert it.
    pub fn add_text(
        &self,
        provider: &dyn EmbeddingProvider,
        text: &str,
        metadata: Metadata,
        normalize: bool,
    ) -> Result<AddResult> {
        let embedding = provider
            .embed(text)
            .map_err(|e| StoreError::Embedding(e.to_string()))?;
        self.add(text, embedding, metadata, normalize)
    }

    /// Embed `texts` in one provider call and insert them as a batch.
    pub fn add_texts(
        &self,
        provider: &dyn EmbeddingProvider,
        texts: &[&str],
        normalize: bool,
    ) -> Result<Vec<AddResult>> {
        let embeddings = provider
            .embed_batch(texts)
            .map_err(|e| StoreError::Embedding(e.to_string()))?;
        if embeddings.len() != texts.len() {
            return Err(StoreError::Embedding(format!(
                "provider returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }
        let records = texts
            .iter()
            .zip(embeddings)
            .map(|(text, embedding)| NewRecord::new(*text, embedding))
            .collect();
        self.add_batch(records, normalize)
    }

    // ── Persistence ───────────────────────────────────────────────────────────

    /// Serialize the table to `path`. The read lock is held only while copying.
    pub fn save(&self, path: impl AsRef<Path>, format: Format) -> Result<()> {
        let path = path.as_ref();
        let snapshot = self.snapshot()?;
        let bytes = snapshot.encode(format)?;
        persist::write_atomic(path, &bytes)?;
        tracing::info!(path = %path.display(), %format, rows = snapshot.metadata.len(), "store saved");
        Ok(())
    }

    /// Replace the table with the snapshot at `path`. On any failure the
    /// current table is left untouched.
    pub fn load(&self, path: impl AsRef<Path>, format: Format) -> Result<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let rows = self.install(&bytes, format)?;
        tracing::info!(path = %path.display(), %format, rows, "store loaded");
        Ok(())
    }

    pub fn save_to(&self, medium: &dyn StorageMedium, name: &str, format: Format) -> Result<()> {
        let snapshot = self.snapshot()?;
        medium.write(name, format, &snapshot.encode(format)?)?;
        tracing::info!(collection = name, %format, rows = snapshot.metadata.len(), "collection saved");
        Ok(())
    }

    pub fn load_from(&self, medium: &dyn StorageMedium, name: &str, format: Format) -> Result<()> {
        let bytes = medium.read(name, format)?;
        let rows = self.install(&bytes, format)?;
        tracing::info!(collection = name, %format, rows, "collection loaded");
        Ok(())
    }

    fn install(&self, bytes: &[u8], format: Format) -> Result<usize> {
        let table = Snapshot::decode(bytes, format)?.into_table()?;
        let rows = table.len();
        *self.write()? = table;
        Ok(rows)
    }

    // ── Connection maintenance ────────────────────────────────────────────────

    fn recompute(&self, id: &str) -> Result<()> {
        let k = self.options.k;
        let plan = {
            let table = self.read()?;
            graph::plan_recompute(&table, id, k)?
        };
        let Some(plan) = plan else {
            return Ok(());
        };
        let own = plan.connections.len();
        let touched = {
            let mut table = self.write()?;
            graph::commit_recompute(&mut table, plan, k)
        };
        tracing::debug!(id = %id, k, connections = own, touched, "connections recomputed");
        Ok(())
    }

    fn rebuild(&self) -> Result<()> {
        let k = self.options.k;
        let plans = {
            let table = self.read()?;
            graph::plan_rebuild(&table, k)?
        };
        let rows = plans.len();
        {
            let mut table = self.write()?;
            graph::commit_rebuild(&mut table, plans);
        }
        tracing::info!(rows, k, "connection graph rebuilt");
        Ok(())
    }
}

/// Normalize when asked. Returns `true` if the vector had zero norm and was
/// left as is.
fn prepare_embedding(embedding: &mut [f32], normalize: bool) -> Result<bool> {
    if !normalize {
        return Ok(false);
    }
    match similarity::normalize(embedding) {
        Ok(()) => Ok(false),
        Err(StoreError::ZeroVector) => {
            tracing::warn!(dimension = embedding.len(), "zero vector cannot be normalized; stored unchanged");
            Ok(true)
        }
        Err(e) => Err(e),
    }
}
