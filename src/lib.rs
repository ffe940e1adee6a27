/// Eyes of Azrael - mythology comparison engine
///
/// Compares deities, heroes, creatures, places and concepts across
/// traditions, matches them against mythological archetypes, and answers
/// symbol and etymology queries over a document store.

pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
