//! Error taxonomy for the vector store.
//!
//! Every failure is recoverable by the caller; the store never retries.
//! [`StoreError::ZeroVector`] is informational: normalization reports it and
//! leaves the input untouched.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("semantic connections are not enabled for this table")]
    Disabled,

    #[error("zero-norm vector")]
    ZeroVector,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("format error: {0}")]
    Format(String),

    #[error("embedding provider failed: {0}")]
    Embedding(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Format(err.to_string())
    }
}

impl From<bincode::Error> for StoreError {
    fn from(err: bincode::Error) -> Self {
        Self::Format(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}
