//! Unlocked Vector Table: the embedding matrix and its parallel record array.
//!
//! Row `i` of the matrix always belongs to `records[i]`. Inserts append;
//! deletes compact by shifting later rows down. The first insert establishes
//! the table's dimensionality and every later vector must match it.
//!
//! Locking lives one level up in [`crate::store::VectorStore`].

use ndarray::{Array2, ArrayView1, Axis};
use std::collections::HashMap;

use super::similarity::cosine_similarity;
use super::types::Record;
use crate::error::{Result, StoreError};

#[derive(Debug, Clone)]
pub struct VectorTable {
    matrix: Array2<f32>,
    /// `None` until the first insert fixes it.
    dimension: Option<usize>,
    records: Vec<Record>,
    /// id → row. Rebuilt for shifted rows on delete.
    index: HashMap<String, usize>,
}

impl Default for VectorTable {
    fn default() -> Self {
        Self {
            matrix: Array2::zeros((0, 0)),
            dimension: None,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl VectorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from parallel rows and records.
    ///
    /// Fails with [`StoreError::Format`] if the lengths differ, the rows are
    /// ragged, or two records share an id.
    pub fn from_parts(vectors: Vec<Vec<f32>>, records: Vec<Record>) -> Result<Self> {
        if vectors.len() != records.len() {
            return Err(StoreError::Format(format!(
                "{} vectors but {} metadata records",
                vectors.len(),
                records.len()
            )));
        }

        let mut table = Self::new();
        if vectors.is_empty() {
            return Ok(table);
        }

        let dimension = vectors[0].len();
        let mut flat = Vec::with_capacity(vectors.len() * dimension);
        for (i, row) in vectors.iter().enumerate() {
            if row.len() != dimension {
                return Err(StoreError::Format(format!(
                    "row {i} has dimension {}, expected {dimension}",
                    row.len()
                )));
            }
            flat.extend_from_slice(row);
        }

        table.matrix = Self::matrix_from_flat(vectors.len(), dimension, flat)?;
        table.dimension = Some(dimension);
        for (row, record) in records.iter().enumerate() {
            if table.index.insert(record.id.clone(), row).is_some() {
                return Err(StoreError::Format(format!("duplicate record id: {}", record.id)));
            }
        }
        table.records = records;
        Ok(table)
    }

    /// Row-major matrix from a flat buffer.
    pub(crate) fn matrix_from_flat(
        rows: usize,
        dimension: usize,
        flat: Vec<f32>,
    ) -> Result<Array2<f32>> {
        Array2::from_shape_vec((rows, dimension), flat)
            .map_err(|e| StoreError::Format(format!("bad matrix shape: {e}")))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Established dimensionality, or `None` for a table that never held a row.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, row: usize) -> &Record {
        &self.records[row]
    }

    pub(crate) fn record_mut(&mut self, row: usize) -> &mut Record {
        &mut self.records[row]
    }

    /// Row index of `id`, if present.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Row index of `id`, or [`StoreError::NotFound`].
    pub fn require(&self, id: &str) -> Result<usize> {
        self.position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Embedding stored at `row`.
    pub fn row(&self, row: usize) -> ArrayView1<'_, f32> {
        self.matrix.row(row)
    }

    /// Check `actual` against the established dimension. An empty table
    /// accepts any dimension.
    pub fn check_dimension(&self, actual: usize) -> Result<()> {
        match self.dimension() {
            Some(expected) if expected != actual => {
                Err(StoreError::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }

    /// Append a row and its record. Returns the new row index.
    pub fn push(&mut self, embedding: &[f32], record: Record) -> Result<usize> {
        self.check_dimension(embedding.len())?;
        if self.dimension.is_none() {
            self.matrix = Array2::zeros((0, embedding.len()));
            self.dimension = Some(embedding.len());
        }
        self.matrix
            .push_row(ArrayView1::from(embedding))
            .map_err(|e| StoreError::Format(format!("matrix append failed: {e}")))?;

        let row = self.records.len();
        self.index.insert(record.id.clone(), row);
        self.records.push(record);
        Ok(row)
    }

    /// Overwrite the embedding stored at `row`.
    pub fn replace_row(&mut self, row: usize, embedding: &[f32]) -> Result<()> {
        self.check_dimension(embedding.len())?;
        for (dst, src) in self.matrix.row_mut(row).iter_mut().zip(embedding) {
            *dst = *src;
        }
        Ok(())
    }

    /// Remove `row` and its record, shifting later rows down by one.
    pub fn remove(&mut self, row: usize) -> Record {
        self.matrix.remove_index(Axis(0), row);
        let record = self.records.remove(row);
        self.index.remove(&record.id);
        for (shifted, r) in self.records.iter().enumerate().skip(row) {
            self.index.insert(r.id.clone(), shifted);
        }
        record
    }

    /// Exact top-N cosine ranking of every row against `query`.
    ///
    /// Returns `(row, similarity)` pairs, highest first; equal scores keep
    /// row order. Zero-norm rows are skipped. `top_n` is clamped to the row
    /// count and an empty table yields an empty ranking.
    pub fn rank(&self, query: &[f32], top_n: usize) -> Result<Vec<(usize, f32)>> {
        if self.records.is_empty() {
            return Ok(Vec::new());
        }
        self.check_dimension(query.len())?;

        let query = ArrayView1::from(query);
        let mut ranked: Vec<(usize, f32)> = self
            .matrix
            .rows()
            .into_iter()
            .enumerate()
            .filter_map(|(row, v)| cosine_similarity(query, v).map(|sim| (row, sim)))
            .collect();

        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(top_n.min(self.records.len()));
        Ok(ranked)
    }

    /// All rows as owned vectors, in row order.
    pub fn vectors(&self) -> Vec<Vec<f32>> {
        self.matrix.rows().into_iter().map(|r| r.to_vec()).collect()
    }
}
