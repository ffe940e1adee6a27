//! Error types for the mythology comparison engine.
//!
//! Argument and data-sufficiency errors are hard failures surfaced to the
//! caller. Store errors only surface where the engine cannot tell a missing
//! document from an unreachable store.

use thiserror::Error;

use crate::core::storage::StorageError;

/// Result type alias for comparison engine operations.
pub type Result<T> = std::result::Result<T, MythologyError>;

/// Smallest number of entities a comparison accepts.
pub const MIN_COMPARED: usize = 2;

/// Largest number of entities a comparison accepts.
pub const MAX_COMPARED: usize = 4;

/// Error enum for comparison, archetype and symbol operations.
#[derive(Error, Debug)]
pub enum MythologyError {
    // =========================================================================
    // Caller Errors
    // =========================================================================

    /// Wrong number of entity ids supplied to a comparison.
    #[error("Comparison requires between 2 and 4 entities, got {count}")]
    InvalidArgument {
        /// Number of ids supplied
        count: usize,
    },

    /// Fewer than two of the requested entities exist in the store.
    #[error("Not enough entities to compare: {resolved} of {requested} resolved (missing: {missing:?})")]
    InsufficientData {
        /// Number of ids requested
        requested: usize,
        /// Number of ids that resolved to a document
        resolved: usize,
        /// Ids that did not resolve
        missing: Vec<String>,
    },

    /// Unknown archetype id.
    #[error("Archetype not found: {id}")]
    NotFound {
        /// The archetype id that was requested
        id: String,
    },

    // =========================================================================
    // Reference Table Errors
    // =========================================================================

    /// Reference tables failed validation.
    #[error("Invalid reference tables: {reason}")]
    InvalidTables {
        /// Description of the validation failure
        reason: String,
    },

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // =========================================================================
    // Infrastructure Errors
    // =========================================================================

    /// Document store failure that could not be treated as absence.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl MythologyError {
    /// Whether the caller can fix this by changing the request.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument { .. } | Self::InsufficientData { .. } | Self::NotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_argument() {
        let err = MythologyError::InvalidArgument { count: 5 };
        let msg = err.to_string();
        assert!(msg.contains("between 2 and 4"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_error_display_insufficient_data() {
        let err = MythologyError::InsufficientData {
            requested: 3,
            resolved: 1,
            missing: vec!["ghost".to_string(), "phantom".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("1 of 3"));
        assert!(msg.contains("ghost"));
    }

    #[test]
    fn test_user_error_classification() {
        assert!(MythologyError::NotFound { id: "x".into() }.is_user_error());
        assert!(!MythologyError::Storage(StorageError::database("down")).is_user_error());
    }

    #[test]
    fn test_error_from_storage() {
        let err: MythologyError = StorageError::query("bad").into();
        assert!(matches!(err, MythologyError::Storage(StorageError::Query(_))));
    }
}
