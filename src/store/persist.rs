//! Snapshot serialization and storage.
//!
//! The structured format is a single JSON document with two parallel arrays:
//!
//! ```json
//! {
//!   "vectors":  [[0.1, 0.2, ...], ...],
//!   "metadata": [{"id": "...", "chunk_text": "...", "metadata": {...}, "connections": [...]}, ...]
//! }
//! ```
//!
//! The binary format is a bincode envelope holding the matrix flat and
//! row-major, with the metadata array carried as embedded JSON bytes.
//! Writes go to a temporary sibling file first and are renamed into place.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::table::VectorTable;
use super::types::Record;
use crate::error::{Result, StoreError};

/// On-disk serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Json,
    Binary,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Binary => "binary",
        }
    }

    /// File extension used by [`DirectoryStorage`].
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "svdb.json",
            Self::Binary => "svdb.bin",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "binary" | "bin" => Ok(Self::Binary),
            _ => Err(format!("unknown format: {s}")),
        }
    }
}

/// The structured document: parallel vectors and metadata records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub vectors: Vec<Vec<f32>>,
    pub metadata: Vec<Record>,
}

impl Snapshot {
    /// Copy the table's contents out.
    pub fn capture(table: &VectorTable) -> Self {
        Self {
            vectors: table.vectors(),
            metadata: table.records().to_vec(),
        }
    }

    /// Validate and build a table. Nothing is applied on failure.
    pub fn into_table(self) -> Result<VectorTable> {
        VectorTable::from_parts(self.vectors, self.metadata)
    }

    pub fn encode(&self, format: Format) -> Result<Vec<u8>> {
        match format {
            Format::Json => Ok(serde_json::to_vec(self)?),
            Format::Binary => {
                let envelope = BinaryEnvelope {
                    version: BINARY_VERSION,
                    rows: self.vectors.len() as u64,
                    dimension: self.vectors.first().map_or(0, |v| v.len()) as u64,
                    data: self.vectors.iter().flatten().copied().collect(),
                    metadata: serde_json::to_vec(&self.metadata)?,
                };
                Ok(bincode::serialize(&envelope)?)
            }
        }
    }

    pub fn decode(bytes: &[u8], format: Format) -> Result<Self> {
        match format {
            Format::Json => Ok(serde_json::from_slice(bytes)?),
            Format::Binary => {
                let envelope: BinaryEnvelope = bincode::deserialize(bytes)?;
                if envelope.version != BINARY_VERSION {
                    return Err(StoreError::Format(format!(
                        "unsupported binary snapshot version {}",
                        envelope.version
                    )));
                }
                let metadata: Vec<Record> = serde_json::from_slice(&envelope.metadata)?;
                let rows = usize::try_from(envelope.rows)
                    .map_err(|_| StoreError::Format(format!("row count {} too large", envelope.rows)))?;
                let dimension = usize::try_from(envelope.dimension).map_err(|_| {
                    StoreError::Format(format!("dimension {} too large", envelope.dimension))
                })?;
                if rows != metadata.len() {
                    return Err(StoreError::Format(format!(
                        "header says {rows} rows but {} metadata records",
                        metadata.len()
                    )));
                }
                if dimension == 0 && rows > 0 {
                    return Err(StoreError::Format(format!(
                        "{rows} rows with zero dimension"
                    )));
                }
                if rows.checked_mul(dimension) != Some(envelope.data.len()) {
                    return Err(StoreError::Format(format!(
                        "matrix data holds {} values, header says {rows}x{dimension}",
                        envelope.data.len()
                    )));
                }
                let vectors = if dimension == 0 {
                    Vec::new()
                } else {
                    envelope
                        .data
                        .chunks_exact(dimension)
                        .map(<[f32]>::to_vec)
                        .collect()
                };
                Ok(Self { vectors, metadata })
            }
        }
    }
}

const BINARY_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct BinaryEnvelope {
    version: u32,
    rows: u64,
    dimension: u64,
    data: Vec<f32>,
    metadata: Vec<u8>,
}

/// Write `bytes` to `path` via a temporary sibling file and an atomic rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    if let Err(e) = std::fs::write(&tmp, bytes) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Named byte storage for collections.
pub trait StorageMedium: Send + Sync {
    fn read(&self, name: &str, format: Format) -> Result<Vec<u8>>;

    fn write(&self, name: &str, format: Format, bytes: &[u8]) -> Result<()>;
}

/// Stores each collection as `<root>/<name>.<ext>`.
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str, format: Format) -> PathBuf {
        self.root.join(format!("{name}.{}", format.extension()))
    }

    pub fn exists(&self, name: &str, format: Format) -> bool {
        self.path_for(name, format).exists()
    }
}

impl StorageMedium for DirectoryStorage {
    fn read(&self, name: &str, format: Format) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.path_for(name, format))?)
    }

    fn write(&self, name: &str, format: Format, bytes: &[u8]) -> Result<()> {
        write_atomic(&self.path_for(name, format), bytes)
    }
}
