//! Error types for the storage module.
//!
//! Provides a unified error type for document store operations, separating
//! infrastructure failures (connection, query, permission) from simple
//! absence of a record.

use thiserror::Error;

/// Unified error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or operation error.
    #[error("Database error: {0}")]
    Database(String),

    /// Initialization failure (startup, connection).
    #[error("Initialization failed: {0}")]
    Init(String),

    /// Query execution error (invalid syntax, timeout).
    #[error("Query error: {0}")]
    Query(String),

    /// Record not found in database.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Permission or authorization error.
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Snapshot or document shape is not what the store expects.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error for file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Create a database error with the given message.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create an initialization error with the given message.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    /// Create a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Create a not found error with the given message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid document error with the given message.
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Whether this error only reports that a record is absent.
    ///
    /// Callers probing several collections treat these as a plain miss;
    /// everything else is an infrastructure failure.
    pub fn is_absence(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
