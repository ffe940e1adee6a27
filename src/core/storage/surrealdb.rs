//! SurrealDB storage wrapper for the mythology reference store.
//!
//! Provides a thread-safe wrapper around embedded SurrealDB, either persisted
//! with RocksDB or held in memory. Each [`Collection`] maps to a SurrealDB
//! table whose record ids are the entity ids.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::Surreal;

use super::error::{StorageError, StorageResult};
use super::{Collection, Document, DocumentStore, Snapshot};

const SELECT_ONE: &str = "SELECT *, meta::id(id) AS id FROM type::thing($table, $id)";
const SELECT_ALL: &str = "SELECT *, meta::id(id) AS id FROM type::table($table)";
const UPSERT_ONE: &str = "UPSERT type::thing($table, $id) CONTENT $data";

/// Storage configuration for SurrealDB.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SurrealDB namespace (default: "azrael")
    pub namespace: String,
    /// SurrealDB database name (default: "main")
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: "azrael".to_string(),
            database: "main".to_string(),
        }
    }
}

/// Embedded SurrealDB document store.
///
/// Cloning is cheap; clones share the same database handle.
#[derive(Clone)]
pub struct SurrealStorage {
    db: Arc<Surreal<Db>>,
    config: StorageConfig,
}

impl SurrealStorage {
    /// Open (or create) a RocksDB-backed store at `db_path`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Init` if directory creation fails and
    /// `StorageError::Database` if the connection or namespace selection fails.
    pub async fn open(db_path: PathBuf, config: StorageConfig) -> StorageResult<Self> {
        if !db_path.exists() {
            std::fs::create_dir_all(&db_path).map_err(|e| {
                StorageError::init(format!(
                    "Failed to create database directory at {}: {}",
                    db_path.display(),
                    e
                ))
            })?;
        }

        let db = Surreal::new::<RocksDb>(db_path.clone())
            .await
            .map_err(|e| StorageError::database(format!("Failed to connect to SurrealDB: {}", e)))?;

        let storage = Self::select(db, config).await?;

        tracing::info!(
            path = %db_path.display(),
            namespace = %storage.config.namespace,
            database = %storage.config.database,
            "SurrealDB storage initialized"
        );

        Ok(storage)
    }

    /// Create an ephemeral in-memory store.
    pub async fn in_memory(config: StorageConfig) -> StorageResult<Self> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| StorageError::database(format!("Failed to start in-memory SurrealDB: {}", e)))?;

        let storage = Self::select(db, config).await?;
        tracing::debug!(namespace = %storage.config.namespace, "in-memory SurrealDB storage initialized");
        Ok(storage)
    }

    async fn select(db: Surreal<Db>, config: StorageConfig) -> StorageResult<Self> {
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| StorageError::database(format!("Failed to select namespace/database: {}", e)))?;

        Ok(Self {
            db: Arc::new(db),
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Insert or replace a document.
    ///
    /// A stored `id` field is dropped; the record id is authoritative.
    /// Top-level `null` fields are dropped too: SurrealDB stores them as
    /// NONE, so they read back as absent rather than null.
    pub async fn upsert_document(
        &self,
        collection: Collection,
        id: &str,
        mut document: Document,
    ) -> StorageResult<()> {
        document.remove("id");
        document.retain(|_, value| !value.is_null());

        self.db
            .query(UPSERT_ONE)
            .bind(("table", collection.as_str().to_string()))
            .bind(("id", id.to_string()))
            .bind(("data", serde_json::Value::Object(document)))
            .await
            .map_err(|e| StorageError::query(e.to_string()))?
            .check()
            .map_err(|e| StorageError::query(e.to_string()))?;

        Ok(())
    }

    /// Write every document of a snapshot. Returns the number written.
    pub async fn import(&self, snapshot: Snapshot) -> StorageResult<usize> {
        let mut written = 0;
        for (collection, documents) in snapshot {
            for (id, document) in documents {
                self.upsert_document(collection, &id, document).await?;
                written += 1;
            }
            tracing::debug!(%collection, total = written, "collection imported");
        }
        Ok(written)
    }

    /// Check if the database is healthy and accessible.
    pub async fn health_check(&self) -> StorageResult<()> {
        self.db
            .query("RETURN 1")
            .await
            .map_err(|e| StorageError::database(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    async fn select_rows(
        &self,
        sql: &'static str,
        collection: Collection,
        id: Option<&str>,
    ) -> StorageResult<Vec<serde_json::Value>> {
        let mut query = self
            .db
            .query(sql)
            .bind(("table", collection.as_str().to_string()));
        if let Some(id) = id {
            query = query.bind(("id", id.to_string()));
        }

        query
            .await
            .map_err(|e| StorageError::query(e.to_string()))?
            .take(0)
            .map_err(|e| StorageError::query(e.to_string()))
    }
}

/// Split a selected row into its record id and remaining fields.
fn into_document(row: serde_json::Value) -> StorageResult<(String, Document)> {
    let mut fields = match row {
        serde_json::Value::Object(fields) => fields,
        other => {
            return Err(StorageError::invalid_document(format!(
                "expected an object row, got {other}"
            )))
        }
    };

    let id = match fields.remove("id") {
        Some(serde_json::Value::String(id)) => id,
        Some(other) => other.to_string(),
        None => return Err(StorageError::invalid_document("row is missing its record id")),
    };

    Ok((id, fields))
}

#[async_trait]
impl DocumentStore for SurrealStorage {
    async fn get_document(&self, collection: Collection, id: &str) -> StorageResult<Option<Document>> {
        let rows = self.select_rows(SELECT_ONE, collection, Some(id)).await?;
        match rows.into_iter().next() {
            Some(row) => into_document(row).map(|(_, document)| Some(document)),
            None => Ok(None),
        }
    }

    async fn list_documents(&self, collection: Collection) -> StorageResult<Vec<(String, Document)>> {
        self.select_rows(SELECT_ALL, collection, None)
            .await?
            .into_iter()
            .map(into_document)
            .collect()
    }
}

impl std::fmt::Debug for SurrealStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealStorage")
            .field("db", &"<Surreal<Db>>")
            .field("config", &self.config)
            .finish()
    }
}
