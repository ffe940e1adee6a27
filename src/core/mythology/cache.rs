//! Entity memoization for the comparison engine.
//!
//! Each engine instance owns one [`EntityCache`]. Entries never expire on
//! their own; they leave the cache only through [`EntityCache::clear`] or,
//! when a capacity is configured, through LRU eviction.
//!
//! # Thread Safety
//!
//! All mutable state sits behind a `tokio::sync::Mutex`; lookups promote
//! entries in the LRU order, so even reads need exclusive access.

use std::num::NonZeroUsize;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::types::Entity;

// ============================================================================
// CacheConfig
// ============================================================================

/// Configuration options for the entity cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheConfig {
    /// Maximum number of cached entities.
    ///
    /// `None` keeps every fetched entity for the lifetime of the engine.
    pub capacity: Option<usize>,
}

impl CacheConfig {
    /// Bounded cache evicting least recently used entities.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
        }
    }
}

// ============================================================================
// CacheStats
// ============================================================================

/// Statistics about cache effectiveness.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that fell through to the store.
    pub misses: u64,
    /// Entries pushed out by the capacity limit.
    pub evictions: u64,
    /// Explicit clears.
    pub clears: u64,
    /// Entities currently cached.
    pub current_size: usize,
    /// Configured capacity, if bounded.
    pub capacity: Option<usize>,
}

impl CacheStats {
    /// Cache hit rate in `[0, 1]`; 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// ============================================================================
// EntityCache
// ============================================================================

struct Inner {
    entries: LruCache<String, Entity>,
    stats: CacheStats,
}

/// Id-keyed entity cache.
pub struct EntityCache {
    inner: Mutex<Inner>,
}

impl EntityCache {
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = config.capacity.and_then(NonZeroUsize::new);
        let entries = match capacity {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };

        Self {
            inner: Mutex::new(Inner {
                entries,
                stats: CacheStats {
                    capacity: capacity.map(NonZeroUsize::get),
                    ..CacheStats::default()
                },
            }),
        }
    }

    /// Look up an entity by id, recording a hit or miss.
    pub async fn get(&self, id: &str) -> Option<Entity> {
        let mut inner = self.inner.lock().await;
        let found = inner.entries.get(id).cloned();
        match found {
            Some(entity) => {
                inner.stats.hits += 1;
                Some(entity)
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Store an entity under its id.
    pub async fn put(&self, entity: Entity) {
        let mut inner = self.inner.lock().await;
        let id = entity.id.clone();
        if let Some((evicted, _)) = inner.entries.push(id.clone(), entity) {
            if evicted != id {
                inner.stats.evictions += 1;
                tracing::debug!(evicted = %evicted, "entity evicted from cache");
            }
        }
    }

    /// Drop every cached entity.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.entries.clear();
        inner.stats.clears += 1;
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of the current statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        CacheStats {
            current_size: inner.entries.len(),
            ..inner.stats.clone()
        }
    }
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl std::fmt::Debug for EntityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCache").finish_non_exhaustive()
    }
}
