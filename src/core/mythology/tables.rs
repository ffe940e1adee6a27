//! Reference tables: archetypes, symbols, cultural clusters and etymology.
//!
//! Tables are plain data. The bundled set comes from [`AssetLoader`]; an
//! external YAML document with the same four sections can replace it.
//!
//! ```yaml
//! archetypes: [...]
//! symbols: [...]
//! culturalClusters: [...]
//! etymology: [...]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::error::{MythologyError, Result};
use super::types::{normalize_symbol_key, Archetype, CulturalCluster, EtymologicalRoot, Symbol};
use crate::core::assets::AssetLoader;

/// Serialized form of the reference tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TablesDocument {
    #[serde(default)]
    pub archetypes: Vec<Archetype>,
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    #[serde(default)]
    pub cultural_clusters: Vec<CulturalCluster>,
    #[serde(default)]
    pub etymology: Vec<EtymologicalRoot>,
}

/// Read-only lookup tables consulted by the comparison engine.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    archetypes: Vec<Archetype>,
    symbols: IndexMap<String, Symbol>,
    /// alias key -> symbol key
    aliases: HashMap<String, String>,
    cultural_clusters: Vec<CulturalCluster>,
    etymology: Vec<EtymologicalRoot>,
}

impl ReferenceTables {
    /// Tables bundled into the binary.
    ///
    /// Validation problems are logged; the tables are still usable.
    pub fn bundled() -> Self {
        let tables = Self::build(TablesDocument {
            archetypes: AssetLoader::load_archetypes(),
            symbols: AssetLoader::load_symbols(),
            cultural_clusters: AssetLoader::load_cultural_clusters(),
            etymology: AssetLoader::load_etymology(),
        });

        if let Err(e) = tables.validate() {
            tracing::warn!(error = %e, "bundled reference tables failed validation");
        }

        tracing::info!(
            archetypes = tables.archetypes.len(),
            symbols = tables.symbols.len(),
            clusters = tables.cultural_clusters.len(),
            roots = tables.etymology.len(),
            "reference tables loaded"
        );

        tables
    }

    /// Parse and validate a full tables document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let document: TablesDocument = serde_yaml::from_str(yaml)?;
        Self::from_document(document)
    }

    /// Load and validate a tables document from disk.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        let tables = Self::from_yaml_str(&yaml)?;
        tracing::info!(path = %path.display(), "reference tables loaded from file");
        Ok(tables)
    }

    /// Build and validate tables from an in-memory document.
    pub fn from_document(document: TablesDocument) -> Result<Self> {
        let tables = Self::build(document);
        tables.validate()?;
        Ok(tables)
    }

    fn build(document: TablesDocument) -> Self {
        let mut symbols = IndexMap::with_capacity(document.symbols.len());
        let mut aliases = HashMap::new();

        for mut symbol in document.symbols {
            symbol.key = normalize_symbol_key(&symbol.key);
            for alias in &symbol.aliases {
                aliases.insert(normalize_symbol_key(alias), symbol.key.clone());
            }
            symbols.insert(symbol.key.clone(), symbol);
        }

        Self {
            archetypes: document.archetypes,
            symbols,
            aliases,
            cultural_clusters: document.cultural_clusters,
            etymology: document.etymology,
        }
    }

    /// Check structural invariants.
    ///
    /// - archetype ids are unique and non-empty
    /// - every archetype has a non-empty vocabulary
    /// - symbol aliases don't shadow another symbol's key
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for archetype in &self.archetypes {
            if archetype.id.as_str().trim().is_empty() {
                return Err(invalid("archetype with empty id"));
            }
            if !seen.insert(archetype.id.as_str()) {
                return Err(invalid(format!("duplicate archetype id '{}'", archetype.id)));
            }
            if archetype.vocabulary().is_empty() {
                return Err(invalid(format!("archetype '{}' has no vocabulary", archetype.id)));
            }
        }

        for (alias, key) in &self.aliases {
            if self.symbols.contains_key(alias) && alias != key {
                return Err(invalid(format!(
                    "symbol alias '{alias}' of '{key}' shadows another symbol"
                )));
            }
        }

        Ok(())
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    pub fn archetype(&self, id: &str) -> Option<&Archetype> {
        self.archetypes.iter().find(|a| a.id.as_str() == id)
    }

    /// Symbols keyed by normalized key.
    pub fn symbols(&self) -> &IndexMap<String, Symbol> {
        &self.symbols
    }

    /// Look up a symbol by free-form name, key or alias.
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        let key = normalize_symbol_key(name);
        self.symbols.get(&key).or_else(|| {
            self.aliases
                .get(&key)
                .and_then(|target| self.symbols.get(target))
        })
    }

    pub fn cultural_clusters(&self) -> &[CulturalCluster] {
        &self.cultural_clusters
    }

    pub fn etymology(&self) -> &[EtymologicalRoot] {
        &self.etymology
    }
}

fn invalid(reason: impl Into<String>) -> MythologyError {
    MythologyError::InvalidTables {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_tables_validate() {
        let tables = ReferenceTables::bundled();
        assert!(tables.validate().is_ok());
        assert!(tables.archetype("sky-father").is_some());
        assert!(tables.archetype("nonexistent").is_none());
    }

    #[test]
    fn test_symbol_lookup_by_alias_and_free_form() {
        let tables = ReferenceTables::bundled();
        assert_eq!(tables.symbol("Lightning Bolt").unwrap().key, "lightning");
        assert_eq!(tables.symbol("thunderbolt").unwrap().key, "lightning");
        assert_eq!(tables.symbol("EAGLE").unwrap().key, "eagle");
        assert!(tables.symbol("unknown-symbol-xyz").is_none());
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
archetypes:
  - id: hearth-keeper
    name: Hearth Keeper
    domains: [hearth, home, family]
symbols:
  - key: Flame
    aliases: [sacred fire]
    symbolism: The living center of the household
culturalClusters:
  - name: Hellenic
    members: [greek]
"#;
        let tables = ReferenceTables::from_yaml_str(yaml).unwrap();
        assert_eq!(tables.archetypes().len(), 1);
        assert_eq!(tables.symbol("sacred-fire").unwrap().key, "flame");
        assert_eq!(tables.cultural_clusters()[0].name, "Hellenic");
        assert!(tables.etymology().is_empty());
    }

    #[test]
    fn test_duplicate_archetype_rejected() {
        let yaml = r#"
archetypes:
  - { id: twin, name: A, domains: [x] }
  - { id: twin, name: B, domains: [y] }
"#;
        let err = ReferenceTables::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, MythologyError::InvalidTables { .. }));
        assert!(err.to_string().contains("twin"));
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        let yaml = "archetypes:\n  - { id: blank, name: Blank }\n";
        assert!(ReferenceTables::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_shadowing_alias_rejected() {
        let yaml = r#"
symbols:
  - { key: owl, symbolism: wisdom }
  - { key: raven, aliases: [owl], symbolism: memory }
"#;
        assert!(ReferenceTables::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_from_yaml_file_missing() {
        let err = ReferenceTables::from_yaml_file(Path::new("/nonexistent/tables.yaml")).unwrap_err();
        assert!(matches!(err, MythologyError::Io(_)));
    }
}
