//! Archetype matching.
//!
//! An entity's searchable text (`name`, `title`, `description`, `domains`,
//! `attributes`, `symbols`) is lowercased into one blob, and each term of an
//! archetype's vocabulary that occurs in the blob counts as a hit. The entity
//! matches when the hit count reaches the matcher's threshold.
//!
//! What "occurs" means is a [`MatchStrategy`]:
//!
//! | Strategy | `war` in `"award"` | `war` in `"wars"` |
//! |----------|--------------------|-------------------|
//! | [`SubstringStrategy`] | hit | hit |
//! | [`TokenStrategy`] | no hit | hit |

use serde::{Deserialize, Serialize};

use super::types::{Archetype, Entity};

/// Hits needed for an entity to match an archetype.
pub const DEFAULT_MATCH_THRESHOLD: usize = 3;

const TEXT_FIELDS: [&str; 3] = ["name", "title", "description"];
const LIST_FIELDS: [&str; 3] = ["domains", "attributes", "symbols"];

// ============================================================================
// Strategies
// ============================================================================

/// Policy deciding whether a vocabulary term occurs in an entity's text.
pub trait MatchStrategy: Send + Sync + std::fmt::Debug {
    /// Name used in configuration.
    fn name(&self) -> &'static str;

    /// Number of `vocabulary` terms found in the lowercased `text`.
    fn count_hits(&self, text: &str, vocabulary: &[String]) -> usize;
}

/// Plain substring containment, no word boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringStrategy;

impl MatchStrategy for SubstringStrategy {
    fn name(&self) -> &'static str {
        "substring"
    }

    fn count_hits(&self, text: &str, vocabulary: &[String]) -> usize {
        vocabulary
            .iter()
            .filter(|term| !term.is_empty() && text.contains(term.as_str()))
            .count()
    }
}

/// Whole-token matching with naive plural folding.
///
/// Multi-word terms must appear as a contiguous token run.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenStrategy;

impl MatchStrategy for TokenStrategy {
    fn name(&self) -> &'static str {
        "token"
    }

    fn count_hits(&self, text: &str, vocabulary: &[String]) -> usize {
        let tokens = tokenize(text);
        vocabulary
            .iter()
            .filter(|term| {
                let needle = tokenize(term);
                !needle.is_empty()
                    && tokens
                        .windows(needle.len())
                        .any(|window| window == needle.as_slice())
            })
            .count()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| fold_plural(&word.to_lowercase()))
        .collect()
}

fn fold_plural(word: &str) -> String {
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Configurable strategy selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategyKind {
    #[default]
    Substring,
    Token,
}

impl MatchStrategyKind {
    pub fn build(self) -> Box<dyn MatchStrategy> {
        match self {
            Self::Substring => Box::new(SubstringStrategy),
            Self::Token => Box::new(TokenStrategy),
        }
    }
}

/// Matcher settings, as read from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub strategy: MatchStrategyKind,
    pub threshold: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            strategy: MatchStrategyKind::default(),
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

// ============================================================================
// ArchetypeMatcher
// ============================================================================

/// Scores entities against archetype vocabularies.
///
/// Stateless apart from its settings; every method is a pure function of
/// its arguments.
#[derive(Debug)]
pub struct ArchetypeMatcher {
    strategy: Box<dyn MatchStrategy>,
    threshold: usize,
}

impl ArchetypeMatcher {
    /// Threshold is clamped to at least one hit.
    pub fn new(strategy: Box<dyn MatchStrategy>, threshold: usize) -> Self {
        Self {
            strategy,
            threshold: threshold.max(1),
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.strategy.build(), config.threshold)
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of vocabulary terms of `archetype` found in the entity's text.
    pub fn hit_count(&self, entity: &Entity, archetype: &Archetype) -> usize {
        self.strategy
            .count_hits(&entity_text(entity), &archetype.vocabulary())
    }

    pub fn matches(&self, entity: &Entity, archetype: &Archetype) -> bool {
        self.hit_count(entity, archetype) >= self.threshold
    }

    /// Mean hit count over `entities`; 0.0 for an empty group.
    pub fn score<'a, I>(&self, entities: I, archetype: &Archetype) -> f64
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        let vocabulary = archetype.vocabulary();
        let (total, count) = entities.into_iter().fold((0usize, 0usize), |(total, count), entity| {
            let hits = self.strategy.count_hits(&entity_text(entity), &vocabulary);
            (total + hits, count + 1)
        });

        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }
}

impl Default for ArchetypeMatcher {
    fn default() -> Self {
        Self::new(Box::new(SubstringStrategy), DEFAULT_MATCH_THRESHOLD)
    }
}

/// Lowercased searchable text of an entity.
pub fn entity_text(entity: &Entity) -> String {
    let mut parts: Vec<&str> = TEXT_FIELDS
        .iter()
        .filter_map(|field| entity.text(field))
        .collect();
    for field in LIST_FIELDS {
        parts.extend(entity.string_list(field));
    }
    parts.join(" ").to_lowercase()
}
