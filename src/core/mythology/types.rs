//! Core data models for the comparison engine.
//!
//! - [`Entity`]: a loosely-typed document fetched from the store
//! - [`EntityRef`]: `(collection, id)` key for typed lookups
//! - [`ArchetypeId`] / [`Archetype`]: mythological archetype definitions
//! - [`Symbol`] / [`SymbolCulture`]: cross-cultural symbol meanings
//! - [`CulturalCluster`]: named groups of related mythologies
//! - [`EtymologicalRoot`]: name roots shared across traditions
//!
//! # Design Notes
//!
//! - Reference types use `#[serde(rename_all = "camelCase")]` to match the
//!   bundled YAML tables.
//! - No entity field is guaranteed; accessors return empty values for
//!   absent or mistyped fields instead of failing.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::storage::{Collection, Document};

// ============================================================================
// Entity
// ============================================================================

/// Field names the engine decorates onto every entity.
pub const RESERVED_FIELDS: [&str; 2] = ["id", "collection"];

/// A mythology entity as stored, decorated with its id and collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub collection: Collection,
    #[serde(flatten)]
    pub fields: Document,
}

impl Entity {
    /// Build an entity from a stored document.
    ///
    /// Stored `id`/`collection` fields are dropped in favor of the decorated values.
    pub fn from_document(collection: Collection, id: impl Into<String>, mut document: Document) -> Self {
        for reserved in RESERVED_FIELDS {
            document.remove(reserved);
        }
        Self {
            id: id.into(),
            collection,
            fields: document,
        }
    }

    /// Raw field value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// String field, ignoring empty strings.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// First non-empty string among `names`, in order.
    pub fn first_text(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.text(name))
    }

    /// String elements of an array field. Absent or non-array fields are empty.
    pub fn string_list(&self, name: &str) -> Vec<&str> {
        match self.fields.get(name) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// `name`, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.text("name").unwrap_or(&self.id)
    }

    /// Tradition the entity belongs to, lowercased.
    pub fn mythology(&self) -> Option<String> {
        self.first_text(&["mythology", "tradition"])
            .map(str::to_lowercase)
    }

    /// Ids listed in `relatedEntities`.
    ///
    /// Entries may be plain id strings or objects carrying an `id`.
    pub fn related_ids(&self) -> Vec<&str> {
        match self.fields.get("relatedEntities") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(id) => Some(id.as_str()),
                    Value::Object(obj) => obj.get("id").and_then(Value::as_str),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Composite key for an entity whose collection is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub collection: Collection,
    pub id: String,
}

impl EntityRef {
    pub fn new(collection: Collection, id: impl Into<String>) -> Self {
        Self {
            collection,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

// ============================================================================
// ValueKind - runtime type of a field value
// ============================================================================

/// Runtime kind of a field value, used for field alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Missing,
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    pub fn of(value: Option<&Value>) -> Self {
        match value {
            None => Self::Missing,
            Some(Value::Null) => Self::Null,
            Some(Value::Bool(_)) => Self::Bool,
            Some(Value::Number(_)) => Self::Number,
            Some(Value::String(_)) => Self::String,
            Some(Value::Array(_)) => Self::Array,
            Some(Value::Object(_)) => Self::Object,
        }
    }
}

// ============================================================================
// ArchetypeId - Type-safe identifier
// ============================================================================

/// Type-safe wrapper for archetype identifiers.
///
/// ```rust
/// use eyes_of_azrael::core::mythology::ArchetypeId;
///
/// let id = ArchetypeId::new("sky-father");
/// assert_eq!(id.as_str(), "sky-father");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchetypeId(String);

impl ArchetypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchetypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArchetypeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ArchetypeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Archetype
// ============================================================================

/// A cross-cultural mythological archetype.
///
/// ```yaml
/// - id: trickster
///   name: Trickster
///   attributes: [cunning, mischief, shapeshifter]
///   domains: [trickery, chaos]
///   symbols: [fox, raven]
///   examples:
///     norse: loki
///     greek: hermes
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Archetype {
    pub id: ArchetypeId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Tradition -> example entity id.
    #[serde(default)]
    pub examples: IndexMap<String, String>,
}

impl Archetype {
    /// Combined matching vocabulary: attributes, then domains, then symbols.
    ///
    /// Terms are trimmed and lowercased; duplicates keep their first position.
    pub fn vocabulary(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for term in self.attributes.iter().chain(&self.domains).chain(&self.symbols) {
            let term = term.trim().to_lowercase();
            if !term.is_empty() && !terms.contains(&term) {
                terms.push(term);
            }
        }
        terms
    }
}

// ============================================================================
// Symbol
// ============================================================================

/// One tradition's reading of a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolCulture {
    /// Deity or figure the symbol is attached to.
    pub figure: String,
    pub meaning: String,
}

/// A symbol and its meanings across traditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    /// Normalized key (lowercase, hyphenated).
    pub key: String,
    /// Alternative normalized keys resolving to this symbol.
    #[serde(default)]
    pub aliases: Vec<String>,
    pub symbolism: String,
    #[serde(default)]
    pub cultures: IndexMap<String, SymbolCulture>,
}

/// Normalize a free-form symbol name into a table key.
///
/// `"Lightning Bolt"` becomes `"lightning-bolt"`.
pub fn normalize_symbol_key(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

// ============================================================================
// CulturalCluster / EtymologicalRoot
// ============================================================================

/// Named group of mythologies with shared cultural descent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalCluster {
    pub name: String,
    pub members: Vec<String>,
}

impl CulturalCluster {
    pub fn contains(&self, mythology: &str) -> bool {
        self.members.iter().any(|m| m.eq_ignore_ascii_case(mythology))
    }
}

/// A reconstructed root and the divine names descending from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtymologicalRoot {
    pub root: String,
    pub meaning: String,
    pub cognates: Vec<String>,
}

impl EtymologicalRoot {
    /// Whether any word of `name` is one of this root's cognates.
    pub fn matches_name(&self, name: &str) -> bool {
        name.split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .any(|word| self.cognates.iter().any(|c| c.eq_ignore_ascii_case(word)))
    }
}
