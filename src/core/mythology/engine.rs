//! The comparison engine.
//!
//! [`MythologyComparisons`] ties together the reference tables, an
//! [`EntityFetcher`] over a [`DocumentStore`], and an [`ArchetypeMatcher`].
//! Each instance owns its cache; create one per session or request scope
//! and call [`MythologyComparisons::clear_cache`] to drop stale entities.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use eyes_of_azrael::core::mythology::MythologyComparisons;
//! use eyes_of_azrael::core::storage::MemoryStore;
//!
//! let engine = MythologyComparisons::new(Arc::new(MemoryStore::new()));
//! let comparison = engine.compare_entities(&["zeus", "odin"]).await?;
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use super::cache::{CacheConfig, CacheStats};
use super::comparison::Comparison;
use super::error::{MythologyError, Result, MAX_COMPARED, MIN_COMPARED};
use super::fetcher::EntityFetcher;
use super::matcher::ArchetypeMatcher;
use super::tables::ReferenceTables;
use super::types::{Archetype, ArchetypeId, Entity, EntityRef, EtymologicalRoot, Symbol, SymbolCulture};
use crate::core::storage::{Collection, DocumentStore};

/// Most results returned by [`MythologyComparisons::find_parallel_entities`].
pub const MAX_PARALLELS: usize = 10;

// ============================================================================
// Result types
// ============================================================================

/// An entity ranked against an archetype.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredEntity {
    pub entity: Entity,
    /// Vocabulary hits of this entity alone.
    pub score: f64,
    /// Archetype the score was computed against.
    pub archetype_id: ArchetypeId,
}

/// Cross-cultural reading of one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolAnalysis {
    pub symbol: String,
    pub symbolism: String,
    pub cultures: IndexMap<String, SymbolCulture>,
    pub universal_meaning: String,
}

// ============================================================================
// MythologyComparisons
// ============================================================================

/// Entity comparison and archetype query engine.
pub struct MythologyComparisons {
    tables: ReferenceTables,
    matcher: ArchetypeMatcher,
    fetcher: EntityFetcher,
}

impl MythologyComparisons {
    /// Engine with the bundled tables, default matcher and unbounded cache.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_options(
            store,
            ReferenceTables::bundled(),
            ArchetypeMatcher::default(),
            &CacheConfig::default(),
        )
    }

    pub fn with_options(
        store: Arc<dyn DocumentStore>,
        tables: ReferenceTables,
        matcher: ArchetypeMatcher,
        cache: &CacheConfig,
    ) -> Self {
        debug!(
            strategy = matcher.strategy_name(),
            threshold = matcher.threshold(),
            cache_capacity = ?cache.capacity,
            "comparison engine created"
        );
        Self {
            tables,
            matcher,
            fetcher: EntityFetcher::new(store, cache),
        }
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    pub fn matcher(&self) -> &ArchetypeMatcher {
        &self.matcher
    }

    // ========================================================================
    // Entity access
    // ========================================================================

    /// Resolve an untyped id by probing every collection.
    pub async fn fetch_entity(&self, id: &str) -> Result<Option<Entity>> {
        self.fetcher.fetch_entity(id).await
    }

    /// Resolve a typed reference without probing.
    pub async fn fetch_ref(&self, entity_ref: &EntityRef) -> Result<Option<Entity>> {
        self.fetcher.fetch_ref(entity_ref).await
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Compare 2-4 entities by id.
    ///
    /// Ids that don't resolve are dropped; at least two must remain.
    pub async fn compare_entities<S: AsRef<str>>(&self, ids: &[S]) -> Result<Comparison> {
        check_count(ids.len())?;

        let mut entities = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();
        for id in ids {
            let id = id.as_ref();
            match self.fetcher.fetch_entity(id).await? {
                Some(entity) => entities.push(entity),
                None => missing.push(id.to_string()),
            }
        }

        self.finish(ids.len(), entities, missing)
    }

    /// Compare 2-4 entities by typed reference.
    pub async fn compare_refs(&self, refs: &[EntityRef]) -> Result<Comparison> {
        check_count(refs.len())?;

        let mut entities = Vec::with_capacity(refs.len());
        let mut missing = Vec::new();
        for entity_ref in refs {
            match self.fetcher.fetch_ref(entity_ref).await? {
                Some(entity) => entities.push(entity),
                None => missing.push(entity_ref.to_string()),
            }
        }

        self.finish(refs.len(), entities, missing)
    }

    fn finish(&self, requested: usize, entities: Vec<Entity>, missing: Vec<String>) -> Result<Comparison> {
        if entities.len() < MIN_COMPARED {
            return Err(MythologyError::InsufficientData {
                requested,
                resolved: entities.len(),
                missing,
            });
        }

        if !missing.is_empty() {
            debug!(?missing, "dropping unresolved entities from comparison");
        }

        let comparison = Comparison::build(entities, &self.tables, &self.matcher);
        info!(
            entities = comparison.entities.len(),
            similarities = comparison.similarities.len(),
            archetype_matches = comparison.archetype_matches.len(),
            relationships = comparison.relationships.len(),
            "comparison built"
        );
        Ok(comparison)
    }

    // ========================================================================
    // Archetype queries
    // ========================================================================

    /// Every deity, hero and creature matching an archetype, best first.
    ///
    /// Store errors during the scan propagate.
    pub async fn find_entities_by_archetype(&self, archetype_id: &str) -> Result<Vec<ScoredEntity>> {
        let archetype = self
            .tables
            .archetype(archetype_id)
            .ok_or_else(|| MythologyError::NotFound {
                id: archetype_id.to_string(),
            })?;

        let candidates = self.fetcher.scan(&Collection::ARCHETYPE_SCAN).await?;
        let scanned = candidates.len();
        let matches = self.rank(archetype, candidates);

        info!(archetype = archetype_id, scanned, matched = matches.len(), "archetype scan complete");
        Ok(matches)
    }

    /// Entities from other mythologies sharing an archetype with `entity_id`.
    ///
    /// Returns an empty list when the entity doesn't exist or matches no
    /// archetype. At most [`MAX_PARALLELS`] results, best first.
    pub async fn find_parallel_entities(&self, entity_id: &str) -> Result<Vec<ScoredEntity>> {
        let Some(source) = self.fetcher.fetch_entity(entity_id).await? else {
            debug!(entity_id, "parallel search for unknown entity");
            return Ok(Vec::new());
        };

        let archetypes: Vec<&Archetype> = self
            .tables
            .archetypes()
            .iter()
            .filter(|archetype| self.matcher.matches(&source, archetype))
            .collect();
        if archetypes.is_empty() {
            return Ok(Vec::new());
        }

        let candidates = self.fetcher.scan(&Collection::ARCHETYPE_SCAN).await?;
        let source_mythology = source.mythology();

        let mut parallels: IndexMap<String, ScoredEntity> = IndexMap::new();
        for archetype in archetypes {
            let ranked = self.rank(archetype, candidates.iter().cloned());
            for scored in ranked {
                let entity = &scored.entity;
                if entity.id == source.id {
                    continue;
                }
                if source_mythology.is_some() && entity.mythology() == source_mythology {
                    continue;
                }
                // last seen wins, first-seen position kept
                parallels.insert(entity.id.clone(), scored);
            }
        }

        let mut parallels: Vec<ScoredEntity> = parallels.into_values().collect();
        parallels.sort_by(|a, b| b.score.total_cmp(&a.score));
        parallels.truncate(MAX_PARALLELS);

        info!(entity_id, parallels = parallels.len(), "parallel search complete");
        Ok(parallels)
    }

    fn rank(&self, archetype: &Archetype, candidates: impl IntoIterator<Item = Entity>) -> Vec<ScoredEntity> {
        let mut ranked: Vec<ScoredEntity> = candidates
            .into_iter()
            .filter_map(|entity| {
                let hits = self.matcher.hit_count(&entity, archetype);
                (hits >= self.matcher.threshold()).then(|| ScoredEntity {
                    score: hits as f64,
                    archetype_id: archetype.id.clone(),
                    entity,
                })
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    // ========================================================================
    // Reference lookups
    // ========================================================================

    /// Cross-cultural reading of a symbol, by key or alias.
    pub fn analyze_symbol(&self, key: &str) -> Option<SymbolAnalysis> {
        let symbol = self.tables.symbol(key)?;
        let traditions = symbol.cultures.len();
        let universal_meaning = match traditions {
            0 => symbol.symbolism.clone(),
            1 => format!("{} (recognized in 1 tradition)", symbol.symbolism),
            n => format!("{} (recognized in {n} traditions)", symbol.symbolism),
        };

        Some(SymbolAnalysis {
            symbol: symbol.key.clone(),
            symbolism: symbol.symbolism.clone(),
            cultures: symbol.cultures.clone(),
            universal_meaning,
        })
    }

    /// Etymological roots whose cognates include a word of `name`.
    pub fn analyze_etymology(&self, name: &str) -> Vec<EtymologicalRoot> {
        self.tables
            .etymology()
            .iter()
            .filter(|root| root.matches_name(name))
            .cloned()
            .collect()
    }

    pub fn archetypes(&self) -> &[Archetype] {
        self.tables.archetypes()
    }

    pub fn symbols(&self) -> &IndexMap<String, Symbol> {
        self.tables.symbols()
    }

    // ========================================================================
    // Cache
    // ========================================================================

    /// Drop every cached entity; the next fetch probes the store again.
    pub async fn clear_cache(&self) {
        self.fetcher.clear_cache().await;
        debug!("entity cache cleared");
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.fetcher.cache_stats().await
    }
}

impl std::fmt::Debug for MythologyComparisons {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MythologyComparisons")
            .field("archetypes", &self.tables.archetypes().len())
            .field("matcher", &self.matcher)
            .field("fetcher", &self.fetcher)
            .finish()
    }
}

fn check_count(count: usize) -> Result<()> {
    if (MIN_COMPARED..=MAX_COMPARED).contains(&count) {
        Ok(())
    } else {
        Err(MythologyError::InvalidArgument { count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mythology::matcher::{MatchStrategyKind, MatchingConfig};
    use crate::core::storage::{Document, MemoryStore, MockDocumentStore, StorageError};
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    async fn engine_with(entries: &[(Collection, &str, Value)]) -> (MythologyComparisons, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        for (collection, id, value) in entries {
            store.insert(*collection, *id, doc(value.clone())).await;
        }
        (MythologyComparisons::new(store.clone()), store)
    }

    fn trickster(mythology: &str) -> Value {
        json!({
            "name": "Trickster",
            "mythology": mythology,
            "attributes": ["cunning", "mischief", "shapeshifter"]
        })
    }

    #[test]
    fn test_check_count() {
        assert!(check_count(1).is_err());
        assert!(check_count(2).is_ok());
        assert!(check_count(4).is_ok());
        assert!(matches!(check_count(5), Err(MythologyError::InvalidArgument { count: 5 })));
    }

    #[tokio::test]
    async fn test_compare_drops_unresolved_ids() {
        let (engine, _) = engine_with(&[
            (Collection::Deities, "zeus", json!({"name": "Zeus"})),
            (Collection::Deities, "odin", json!({"name": "Odin"})),
        ])
        .await;

        let comparison = engine.compare_entities(&["zeus", "ghost", "odin"]).await.unwrap();
        let ids: Vec<_> = comparison.entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["zeus", "odin"]);
    }

    #[tokio::test]
    async fn test_compare_insufficient_data_lists_missing() {
        let (engine, _) = engine_with(&[(Collection::Deities, "zeus", json!({"name": "Zeus"}))]).await;

        let err = engine.compare_entities(&["zeus", "ghost"]).await.unwrap_err();
        match err {
            MythologyError::InsufficientData {
                requested,
                resolved,
                missing,
            } => {
                assert_eq!((requested, resolved), (2, 1));
                assert_eq!(missing, ["ghost"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_compare_refs() {
        let (engine, store) = engine_with(&[
            (Collection::Heroes, "heracles", json!({"name": "Heracles"})),
            (Collection::Creatures, "hydra", json!({"name": "Hydra"})),
        ])
        .await;

        let comparison = engine
            .compare_refs(&[
                EntityRef::new(Collection::Heroes, "heracles"),
                EntityRef::new(Collection::Creatures, "hydra"),
            ])
            .await
            .unwrap();
        assert_eq!(comparison.entities.len(), 2);
        assert_eq!(store.read_count(), 2);
    }

    #[tokio::test]
    async fn test_compare_with_unreachable_store() {
        let mut mock = MockDocumentStore::new();
        mock.expect_get_document()
            .returning(|_, _| Err(StorageError::database("connection refused")));

        let engine = MythologyComparisons::new(Arc::new(mock));
        let err = engine.compare_entities(&["zeus", "odin"]).await.unwrap_err();
        assert!(matches!(err, MythologyError::Storage(_)));
    }

    #[tokio::test]
    async fn test_find_by_archetype_unknown_id() {
        let (engine, _) = engine_with(&[]).await;
        let err = engine.find_entities_by_archetype("nonexistent").await.unwrap_err();
        assert!(matches!(err, MythologyError::NotFound { ref id } if id == "nonexistent"));
    }

    #[tokio::test]
    async fn test_find_by_archetype_ignores_places() {
        let (engine, _) = engine_with(&[
            (Collection::Places, "trickster-grove", trickster("greek")),
            (Collection::Creatures, "kitsune", trickster("japanese")),
        ])
        .await;

        let found = engine.find_entities_by_archetype("trickster").await.unwrap();
        let ids: Vec<_> = found.iter().map(|s| s.entity.id.as_str()).collect();
        assert_eq!(ids, ["kitsune"]);
        assert_eq!(found[0].archetype_id.as_str(), "trickster");
    }

    #[tokio::test]
    async fn test_find_by_archetype_propagates_scan_errors() {
        let mut mock = MockDocumentStore::new();
        mock.expect_list_documents()
            .returning(|_| Err(StorageError::query("scan failed")));

        let engine = MythologyComparisons::new(Arc::new(mock));
        let err = engine.find_entities_by_archetype("trickster").await.unwrap_err();
        assert!(matches!(err, MythologyError::Storage(StorageError::Query(_))));
    }

    #[tokio::test]
    async fn test_parallels_for_unknown_entity_are_empty() {
        let (engine, store) = engine_with(&[]).await;
        assert!(engine.find_parallel_entities("ghost").await.unwrap().is_empty());
        // probing only, no scan
        assert_eq!(store.read_count(), Collection::PROBE_ORDER.len() as u64);
    }

    #[tokio::test]
    async fn test_parallels_scan_once_per_call() {
        let (engine, store) = engine_with(&[
            (Collection::Deities, "loki", trickster("norse")),
            (Collection::Heroes, "maui", trickster("polynesian")),
        ])
        .await;

        engine.fetch_entity("loki").await.unwrap();
        let before = store.read_count();
        let parallels = engine.find_parallel_entities("loki").await.unwrap();

        assert_eq!(parallels.len(), 1);
        assert_eq!(parallels[0].entity.id, "maui");
        assert_eq!(
            store.read_count() - before,
            Collection::ARCHETYPE_SCAN.len() as u64
        );
    }

    #[tokio::test]
    async fn test_parallels_without_source_mythology_only_skip_self() {
        let untagged = json!({
            "name": "Trickster",
            "attributes": ["cunning", "mischief", "shapeshifter"]
        });
        let (engine, _) = engine_with(&[
            (Collection::Deities, "wanderer", untagged.clone()),
            (Collection::Heroes, "stranger", untagged),
            (Collection::Creatures, "kitsune", trickster("japanese")),
        ])
        .await;

        let parallels = engine.find_parallel_entities("wanderer").await.unwrap();
        let mut ids: Vec<_> = parallels.iter().map(|p| p.entity.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, ["kitsune", "stranger"]);
    }

    #[tokio::test]
    async fn test_parallels_are_capped() {
        let mut entries = vec![(Collection::Deities, "loki".to_string(), trickster("norse"))];
        for i in 0..15 {
            entries.push((Collection::Heroes, format!("hero-{i}"), trickster(&format!("tradition-{i}"))));
        }
        let store = Arc::new(MemoryStore::new());
        for (collection, id, value) in entries {
            store.insert(collection, id, doc(value)).await;
        }
        let engine = MythologyComparisons::new(store);

        let parallels = engine.find_parallel_entities("loki").await.unwrap();
        assert_eq!(parallels.len(), MAX_PARALLELS);
        assert!(parallels.iter().all(|p| p.entity.id != "loki"));
    }

    #[test]
    fn test_analyze_symbol() {
        let engine = MythologyComparisons::new(Arc::new(MemoryStore::new()));

        let analysis = engine.analyze_symbol("lightning").unwrap();
        assert_eq!(analysis.symbol, "lightning");
        assert_eq!(analysis.cultures["greek"].meaning, "Supreme authority");
        assert!(analysis.universal_meaning.contains("traditions"));

        assert_eq!(engine.analyze_symbol("Thunderbolt").unwrap().symbol, "lightning");
        assert!(engine.analyze_symbol("unknown-symbol-xyz").is_none());
    }

    #[test]
    fn test_analyze_etymology() {
        let engine = MythologyComparisons::new(Arc::new(MemoryStore::new()));
        let roots = engine.analyze_etymology("Jupiter");
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].root, "*dyeus");
        assert!(engine.analyze_etymology("Quetzalcoatl").is_empty());
    }

    #[tokio::test]
    async fn test_token_strategy_engine() {
        let store = Arc::new(MemoryStore::new());
        let engine = MythologyComparisons::with_options(
            store,
            ReferenceTables::bundled(),
            ArchetypeMatcher::from_config(&MatchingConfig {
                strategy: MatchStrategyKind::Token,
                threshold: 3,
            }),
            &CacheConfig::with_capacity(8),
        );
        assert_eq!(engine.matcher().strategy_name(), "token");
        assert_eq!(engine.cache_stats().await.capacity, Some(8));
        assert_eq!(engine.archetypes().len(), engine.tables().archetypes().len());
        assert!(engine.symbols().contains_key("eagle"));
    }
}
