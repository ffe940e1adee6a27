//! Storage module for the mythology reference document store.
//!
//! Entities live in five collections (`deities`, `heroes`, `creatures`,
//! `places`, `concepts`) as open-ended JSON documents keyed by entity id.
//! The comparison engine only ever reads through [`DocumentStore`].
//!
//! # Modules
//!
//! - `collection` - The fixed set of collections and their probe order
//! - `error` - Error types for storage operations
//! - `memory` - In-process store used for tests and snapshot-backed runs
//! - `surrealdb` - Embedded SurrealDB store (RocksDB on disk, or in-memory)

pub mod collection;
pub mod error;
pub mod memory;
pub mod surrealdb;

use std::collections::BTreeMap;

use async_trait::async_trait;
use indexmap::IndexMap;

pub use collection::Collection;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use self::surrealdb::{StorageConfig, SurrealStorage};

/// A raw stored document: field name to JSON value.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Full dump of a store: collection -> entity id -> document.
pub type Snapshot = BTreeMap<Collection, IndexMap<String, Document>>;

/// Read access to the reference document store.
///
/// `get_document` returns `Ok(None)` when the collection has no document
/// with that id; `Err` is reserved for infrastructure failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a single document by id.
    async fn get_document(&self, collection: Collection, id: &str) -> StorageResult<Option<Document>>;

    /// Fetch every document in a collection as `(id, document)` pairs.
    async fn list_documents(&self, collection: Collection) -> StorageResult<Vec<(String, Document)>>;
}

/// Parse a JSON snapshot of the form `{"deities": {"zeus": {...}}, ...}`.
///
/// Unknown collection names and non-object documents are rejected.
pub fn parse_snapshot(json: &str) -> StorageResult<Snapshot> {
    let raw: IndexMap<String, IndexMap<String, serde_json::Value>> = serde_json::from_str(json)?;

    let mut snapshot = Snapshot::new();
    for (collection_name, documents) in raw {
        let collection: Collection = collection_name.parse()?;
        let target = snapshot.entry(collection).or_default();

        for (id, value) in documents {
            match value {
                serde_json::Value::Object(document) => {
                    target.insert(id, document);
                }
                other => {
                    return Err(StorageError::invalid_document(format!(
                        "{collection}/{id}: expected an object, got {other}"
                    )));
                }
            }
        }
    }

    Ok(snapshot)
}
