//! Entity lookup across the reference collections.
//!
//! Untyped ids are resolved by probing each collection in
//! [`Collection::PROBE_ORDER`]; the first collection holding the id wins.
//! Typed [`EntityRef`] lookups go straight to their collection.

use std::sync::Arc;

use tracing::{debug, warn};

use super::cache::{CacheConfig, CacheStats, EntityCache};
use super::error::Result;
use super::types::{Entity, EntityRef};
use crate::core::storage::{Collection, DocumentStore, StorageError};

/// Fetches entities from a [`DocumentStore`] through an owned cache.
pub struct EntityFetcher {
    store: Arc<dyn DocumentStore>,
    cache: EntityCache,
}

impl EntityFetcher {
    pub fn new(store: Arc<dyn DocumentStore>, cache_config: &CacheConfig) -> Self {
        Self {
            store,
            cache: EntityCache::new(cache_config),
        }
    }

    /// Resolve an id by probing every collection in order.
    ///
    /// Returns `Ok(None)` when no collection holds the id. A store error on
    /// one collection is logged and treated as a miss for that collection;
    /// only when every probe failed is the store reported as unreachable.
    pub async fn fetch_entity(&self, id: &str) -> Result<Option<Entity>> {
        if id.trim().is_empty() {
            return Ok(None);
        }

        if let Some(entity) = self.cache.get(id).await {
            debug!(id, collection = %entity.collection, "entity served from cache");
            return Ok(Some(entity));
        }

        let mut answered = false;
        let mut last_error: Option<StorageError> = None;

        for collection in Collection::PROBE_ORDER {
            match self.store.get_document(collection, id).await {
                Ok(Some(document)) => {
                    let entity = Entity::from_document(collection, id, document);
                    debug!(id, %collection, "entity resolved");
                    self.cache.put(entity.clone()).await;
                    return Ok(Some(entity));
                }
                Ok(None) => answered = true,
                Err(e) if e.is_absence() => answered = true,
                Err(e) => {
                    warn!(id, %collection, error = %e, "collection probe failed, treating as not found");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !answered => Err(e.into()),
            _ => {
                debug!(id, "entity not found in any collection");
                Ok(None)
            }
        }
    }

    /// Resolve a typed reference with a single lookup.
    ///
    /// Store errors propagate. The result is cached only when it cannot
    /// shadow an entity cached from an earlier-probed collection.
    pub async fn fetch_ref(&self, entity_ref: &EntityRef) -> Result<Option<Entity>> {
        let cached = self.cache.get(&entity_ref.id).await;
        if let Some(entity) = &cached {
            if entity.collection == entity_ref.collection {
                return Ok(cached);
            }
        }

        let document = match self
            .store
            .get_document(entity_ref.collection, &entity_ref.id)
            .await
        {
            Ok(document) => document,
            Err(e) if e.is_absence() => None,
            Err(e) => return Err(e.into()),
        };

        let Some(document) = document else {
            return Ok(None);
        };

        let entity = Entity::from_document(entity_ref.collection, entity_ref.id.clone(), document);
        if cached.is_none() {
            self.cache.put(entity.clone()).await;
        }
        Ok(Some(entity))
    }

    /// Load every entity in the given collections, in order.
    ///
    /// Store errors propagate; a partial scan is never returned.
    pub async fn scan(&self, collections: &[Collection]) -> Result<Vec<Entity>> {
        let mut entities = Vec::new();
        for &collection in collections {
            let documents = self.store.list_documents(collection).await?;
            debug!(%collection, count = documents.len(), "collection scanned");
            entities.extend(
                documents
                    .into_iter()
                    .map(|(id, document)| Entity::from_document(collection, id, document)),
            );
        }
        Ok(entities)
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}

impl std::fmt::Debug for EntityFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityFetcher")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
