//! Mythology comparison and archetype matching.
//!
//! Compares 2-4 deities, heroes, creatures, places or concepts side by side
//! and matches them against cross-cultural archetypes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     MythologyComparisons                     │
//! │                                                              │
//! │  ┌──────────────────┐   ┌──────────────┐   ┌──────────────┐  │
//! │  │ ReferenceTables  │   │ EntityFetcher│──▶│ EntityCache  │  │
//! │  │ archetypes       │   │ probe order  │   │ (LRU / none) │  │
//! │  │ symbols          │   └──────┬───────┘   └──────────────┘  │
//! │  │ clusters, roots  │          │                             │
//! │  └────────┬─────────┘          ▼                             │
//! │           │             ┌──────────────┐  ┌────────────────┐ │
//! │           └────────────▶│  Comparison  │─▶│ArchetypeMatcher│ │
//! │                         └──────────────┘  └────────────────┘ │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//!                        dyn DocumentStore
//! ```
//!
//! # Modules
//!
//! - `cache` - Instance-owned entity cache
//! - `comparison` - Comparison output types and construction
//! - `engine` - The public query surface
//! - `error` - Error types
//! - `fetcher` - Collection probing and typed lookups
//! - `matcher` - Archetype matching strategies
//! - `tables` - Reference tables
//! - `types` - Core data models

pub mod cache;
pub mod comparison;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod matcher;
pub mod tables;
pub mod types;

pub use cache::{CacheConfig, CacheStats, EntityCache};
pub use comparison::{
    ArchetypeMatch, Comparison, CulturalConnection, CulturalContext, Difference, EntityContext,
    FieldAlignment, GeographicSpread, LinguisticConnection, Relationship, RelationshipKind,
    Similarity, SimilarityKind, SymbolRow, TemporalSpread,
};
pub use engine::{MythologyComparisons, ScoredEntity, SymbolAnalysis, MAX_PARALLELS};
pub use error::{MythologyError, Result, MAX_COMPARED, MIN_COMPARED};
pub use fetcher::EntityFetcher;
pub use matcher::{
    entity_text, ArchetypeMatcher, MatchStrategy, MatchStrategyKind, MatchingConfig,
    SubstringStrategy, TokenStrategy, DEFAULT_MATCH_THRESHOLD,
};
pub use tables::{ReferenceTables, TablesDocument};
pub use types::{
    normalize_symbol_key, Archetype, ArchetypeId, CulturalCluster, Entity, EntityRef,
    EtymologicalRoot, Symbol, SymbolCulture, ValueKind,
};
