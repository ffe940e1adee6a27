use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::mythology::{
    self, ArchetypeMatcher, CacheConfig, MatchingConfig, MythologyComparisons, ReferenceTables,
};
use crate::core::storage::{DocumentStore, StorageConfig};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub data: DataConfig,
    pub matching: MatchingConfig,
    pub cache: CacheConfig,
    pub tables: TablesConfig,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
}

/// Reference table source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    /// External tables YAML replacing the bundled set.
    pub path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from `~/.config/eyes-of-azrael/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, with the same fallbacks as [`AppConfig::load`].
    pub fn load_from(config_path: &Path) -> Self {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e}, using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {}, using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("eyes-of-azrael"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    /// Directory holding the embedded database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join("db")
    }

    /// Configured reference tables; bundled ones unless a path is set.
    pub fn reference_tables(&self) -> mythology::Result<ReferenceTables> {
        match &self.tables.path {
            Some(path) => ReferenceTables::from_yaml_file(path),
            None => Ok(ReferenceTables::bundled()),
        }
    }

    /// Comparison engine wired from this configuration.
    pub fn build_engine(&self, store: Arc<dyn DocumentStore>) -> mythology::Result<MythologyComparisons> {
        Ok(MythologyComparisons::with_options(
            store,
            self.reference_tables()?,
            ArchetypeMatcher::from_config(&self.matching),
            &self.cache,
        ))
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("eyes-of-azrael").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
