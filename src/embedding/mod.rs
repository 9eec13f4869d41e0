//! Embedding-producer contract.
//!
//! The store never generates embeddings. Anything that turns text into a
//! fixed-dimension vector can feed it through [`EmbeddingProvider`]; see
//! [`crate::store::VectorStore::add_text`].

use anyhow::Result;

/// Trait for embedding text into vectors.
///
/// Every vector a provider returns must have [`dimensions`](Self::dimensions)
/// elements. Methods are synchronous; async callers should move them onto a
/// blocking thread.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of text strings. Implementations may override for batched inference.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Number of dimensions this provider produces.
    fn dimensions(&self) -> usize;
}
