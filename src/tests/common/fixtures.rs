//! Test Fixtures
//!
//! Builders for entities and stored documents.

use serde_json::Value;

use crate::core::mythology::Entity;
use crate::core::storage::{Collection, Document};

/// Unwrap a `json!` object into a stored document.
pub fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be a JSON object, got {other}"),
    }
}

pub fn entity(collection: Collection, id: &str, value: Value) -> Entity {
    Entity::from_document(collection, id, document(value))
}
