//! Embedded, in-process vector store with exact cosine search and an
//! incrementally maintained semantic-connection graph.
//!
//! A [`VectorStore`](store::VectorStore) holds fixed-dimension embeddings in
//! a dense row matrix, each row paired with a [`Record`](store::types::Record)
//! carrying an id, the source text, user metadata, and (optionally) the
//! record's `k` nearest neighbors.
//!
//! | Operation | Lock | Cost |
//! |-----------|------|------|
//! | `add` / `update` | write, then read+write for connections | `O(rows × D)` |
//! | `add_batch` | write, then per-record recompute | `O(batch × rows × D)` |
//! | `delete` | write, then full rebuild | `O(rows² × D)` |
//! | `top_cosine_similarity` | read | `O(rows × D)` |
//! | `connected_chunks` / `semantic_search` | read | graph walk |
//! | `save` | read (snapshot only) | `O(rows × D)` |
//!
//! Search is exact brute force. It is the ground truth any future
//! index would be tested against.
//!
//! # Example
//!
//! ```
//! use semvec::store::{StoreOptions, VectorStore};
//! use semvec::store::types::Metadata;
//!
//! let store = VectorStore::new(StoreOptions::with_connections(1));
//! let a = store.add("A", vec![1.0, 0.0], Metadata::new(), false)?.id;
//! store.add("B", vec![0.0, 1.0], Metadata::new(), false)?;
//! let c = store.add("C", vec![1.0, 1.0], Metadata::new(), false)?.id;
//!
//! let hits = store.top_cosine_similarity(&[1.0, 0.0], 2)?;
//! assert_eq!(hits[0].record.id, a);
//! assert_eq!(hits[1].record.id, c);
//! assert_eq!(store.get(&a)?.connections[0].id, c);
//! # Ok::<(), semvec::error::StoreError>(())
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`embedding`]: The embedding-producer contract the store consumes
//! - [`error`]: Error taxonomy
//! - [`store`]: Vector table, similarity search, connection graph, persistence

pub mod config;
pub mod embedding;
pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{StoreOptions, VectorStore};
