pub mod export;
pub mod import;
pub mod inspect;
pub mod modify;
pub mod search;
pub mod stats;

use anyhow::{Context, Result};

use crate::config::SemvecConfig;
use crate::store::persist::{DirectoryStorage, Format};
use crate::store::types::Metadata;
use crate::store::VectorStore;

/// A named collection opened from the configured data directory.
pub struct Collection {
    pub name: String,
    pub store: VectorStore,
    storage: DirectoryStorage,
    format: Format,
}

impl Collection {
    /// Open `name` (or the configured default). A collection that has never
    /// been saved opens empty.
    pub fn open(config: &SemvecConfig, name: Option<&str>) -> Result<Self> {
        let name = name
            .unwrap_or(&config.storage.default_collection)
            .to_string();
        let storage = DirectoryStorage::new(config.resolved_data_dir());
        let format = config.storage.format;
        let store = VectorStore::new(config.store_options());

        if storage.exists(&name, format) {
            store
                .load_from(&storage, &name, format)
                .with_context(|| format!("failed to load collection '{name}'"))?;
        } else {
            tracing::info!(collection = %name, "collection does not exist yet, starting empty");
        }

        Ok(Self {
            name,
            store,
            storage,
            format,
        })
    }

    pub fn save(&self) -> Result<()> {
        self.store
            .save_to(&self.storage, &self.name, self.format)
            .with_context(|| format!("failed to save collection '{}'", self.name))
    }
}

/// Parse a JSON array of numbers, e.g. `[0.1, 0.2, 0.3]`.
pub fn parse_vector(raw: &str) -> Result<Vec<f32>> {
    serde_json::from_str(raw).context("vector must be a JSON array of numbers")
}

/// Parse a JSON object into metadata.
pub fn parse_metadata(raw: &str) -> Result<Metadata> {
    serde_json::from_str(raw).context("metadata must be a JSON object")
}

/// Truncate text to max_chars, appending "..." if truncated.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((end, _)) => format!("{}...", &text[..end]),
    }
}
