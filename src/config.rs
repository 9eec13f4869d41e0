use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::store::graph::DEFAULT_K;
use crate::store::persist::Format;
use crate::store::StoreOptions;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SemvecConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub graph: GraphConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub default_collection: String,
    pub format: Format,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GraphConfig {
    pub enabled: bool,
    pub k: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub top_k: usize,
    pub depth: usize,
    pub normalize: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = default_semvec_dir()
            .join("collections")
            .to_string_lossy()
            .into_owned();
        Self {
            data_dir,
            default_collection: "default".into(),
            format: Format::Json,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            k: DEFAULT_K,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            depth: 1,
            normalize: false,
        }
    }
}

/// Returns `~/.semvec/`, or `./.semvec` when no home directory is known.
pub fn default_semvec_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".semvec")
}

/// Returns the default config file path: `~/.semvec/config.toml`
pub fn default_config_path() -> PathBuf {
    default_semvec_dir().join("config.toml")
}

impl SemvecConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            SemvecConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides (SEMVEC_DATA_DIR, SEMVEC_COLLECTION, SEMVEC_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("SEMVEC_DATA_DIR") {
            self.storage.data_dir = val;
        }
        if let Ok(val) = std::env::var("SEMVEC_COLLECTION") {
            self.storage.default_collection = val;
        }
        if let Ok(val) = std::env::var("SEMVEC_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.storage.default_collection.is_empty() {
            bail!("storage.default_collection must not be empty");
        }
        Ok(())
    }

    /// Resolve the collection directory, expanding `~` if needed.
    pub fn resolved_data_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.data_dir)
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            connections: self.graph.enabled,
            k: self.graph.k,
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SemvecConfig::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.storage.default_collection, "default");
        assert_eq!(config.storage.format, Format::Json);
        assert!(config.graph.enabled);
        assert_eq!(config.graph.k, 5);
        assert!(config.storage.data_dir.ends_with("collections"));
        config.validate().unwrap();
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[logging]
level = "debug"

[storage]
data_dir = "/tmp/semvec"
default_collection = "notes"
format = "binary"

[graph]
k = 3
"#;
        let config: SemvecConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.storage.data_dir, "/tmp/semvec");
        assert_eq!(config.storage.default_collection, "notes");
        assert_eq!(config.storage.format, Format::Binary);
        assert_eq!(config.graph.k, 3);
        // defaults still apply for unset fields
        assert!(config.graph.enabled);
        assert_eq!(config.search.top_k, 5);

        let options = config.store_options();
        assert!(options.connections);
        assert_eq!(options.k, 3);
    }

    #[test]
    fn zero_k_is_raised_by_the_store() {
        let mut config = SemvecConfig::default();
        config.graph.k = 0;
        config.validate().unwrap();
        let store = crate::store::VectorStore::new(config.store_options());
        assert_eq!(store.options().k, 1);
    }

    #[test]
    fn empty_collection_name_is_rejected() {
        let mut config = SemvecConfig::default();
        config.storage.default_collection.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = SemvecConfig::default();
        std::env::set_var("SEMVEC_DATA_DIR", "/tmp/override");
        std::env::set_var("SEMVEC_COLLECTION", "env-collection");
        std::env::set_var("SEMVEC_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.storage.data_dir, "/tmp/override");
        assert_eq!(config.storage.default_collection, "env-collection");
        assert_eq!(config.logging.level, "trace");

        // Clean up
        std::env::remove_var("SEMVEC_DATA_DIR");
        std::env::remove_var("SEMVEC_COLLECTION");
        std::env::remove_var("SEMVEC_LOG_LEVEL");
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/data"), PathBuf::from("/var/data"));
    }
}
