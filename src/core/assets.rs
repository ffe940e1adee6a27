//! Compile-time bundled reference tables.
//!
//! Bundles the mythology YAML tables (archetypes, symbols, cultural clusters,
//! etymological roots) into the binary via `include_str!`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use eyes_of_azrael::core::assets::AssetLoader;
//!
//! let archetypes = AssetLoader::load_archetypes();
//! let symbols = AssetLoader::load_symbols();
//! ```

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::mythology::types::{Archetype, CulturalCluster, EtymologicalRoot, Symbol};

// ============================================================================
// Compile-time bundled YAML
// ============================================================================

const ARCHETYPES: &str = include_str!("../../assets/mythology/archetypes.yaml");
const SYMBOLS: &str = include_str!("../../assets/mythology/symbols.yaml");
const CULTURAL_CLUSTERS: &str = include_str!("../../assets/mythology/cultural_clusters.yaml");
const ETYMOLOGY: &str = include_str!("../../assets/mythology/etymology.yaml");

// ============================================================================
// AssetLoader
// ============================================================================

/// Loads bundled YAML tables into typed Rust structs.
///
/// All assets are compiled into the binary, so there is no filesystem access
/// at runtime. Each file is a YAML list; an entry that fails to parse is
/// logged and skipped rather than failing the whole table.
pub struct AssetLoader;

impl AssetLoader {
    /// Load the archetype definitions.
    pub fn load_archetypes() -> Vec<Archetype> {
        load_list("archetypes", ARCHETYPES)
    }

    /// Load the symbol table.
    pub fn load_symbols() -> Vec<Symbol> {
        load_list("symbols", SYMBOLS)
    }

    /// Load the cultural clusters used for connection detection.
    pub fn load_cultural_clusters() -> Vec<CulturalCluster> {
        load_list("cultural_clusters", CULTURAL_CLUSTERS)
    }

    /// Load the etymological root clusters.
    pub fn load_etymology() -> Vec<EtymologicalRoot> {
        load_list("etymology", ETYMOLOGY)
    }
}

/// Parse a YAML list entry by entry, skipping entries that don't deserialize.
fn load_list<T: DeserializeOwned>(label: &str, yaml: &str) -> Vec<T> {
    let entries: Vec<serde_yaml::Value> = match serde_yaml::from_str(yaml) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(file = label, error = %e, "failed to parse reference table YAML");
            return Vec::new();
        }
    };

    let total = entries.len();
    let items: Vec<T> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_yaml::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(file = label, index, error = %e, "skipping invalid reference table entry");
                None
            }
        })
        .collect();

    debug!(file = label, count = items.len(), total, "reference table loaded");
    items
}

// ============================================================================
// Tests
// ============================================================================
