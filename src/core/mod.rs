pub mod assets;
pub mod logging;

// Comparison engine: reference tables, fetcher, comparator, archetype matcher
pub mod mythology;

// Document store trait plus in-memory and SurrealDB-backed implementations
pub mod storage;
