//! In-process document store.
//!
//! Holds every collection in memory behind a `tokio::sync::RwLock`. Used by
//! tests and by snapshot-backed runs that don't need persistence. Counts
//! reads so callers can observe how many round trips a query issued.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use super::{Collection, Document, DocumentStore, Snapshot, StorageResult};

/// Document store backed by in-memory maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<Snapshot>,
    reads: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            collections: RwLock::new(snapshot),
            reads: AtomicU64::new(0),
        }
    }

    /// Insert or replace a document.
    pub async fn insert(&self, collection: Collection, id: impl Into<String>, document: Document) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_insert_with(IndexMap::new)
            .insert(id.into(), document);
    }

    /// Merge every document of a snapshot into the store.
    ///
    /// Returns the number of documents written.
    pub async fn import(&self, snapshot: Snapshot) -> usize {
        let mut collections = self.collections.write().await;
        let mut written = 0;
        for (collection, documents) in snapshot {
            let target = collections.entry(collection).or_default();
            written += documents.len();
            target.extend(documents);
        }
        written
    }

    /// Number of read operations served so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Total documents across all collections.
    pub async fn len(&self) -> usize {
        self.collections.read().await.values().map(IndexMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(&self, collection: Collection, id: &str) -> StorageResult<Option<Document>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|documents| documents.get(id))
            .cloned())
    }

    async fn list_documents(&self, collection: Collection) -> StorageResult<Vec<(String, Document)>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
