//! Side-by-side entity comparison.
//!
//! [`Comparison::build`] is a pure function over already-fetched entities
//! and the reference tables. Fetching, argument validation and the
//! `InsufficientData` check live in the engine.

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value;

use super::matcher::ArchetypeMatcher;
use super::tables::ReferenceTables;
use super::types::{ArchetypeId, Entity, ValueKind, RESERVED_FIELDS};

// ============================================================================
// Output types
// ============================================================================

/// Structured comparison of 2-4 entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub entities: Vec<Entity>,
    /// Field name -> per-entity values, in first-seen order.
    pub fields: IndexMap<String, FieldAlignment>,
    pub similarities: Vec<Similarity>,
    pub differences: Vec<Difference>,
    pub cultural_context: CulturalContext,
    /// Ranked by score, highest first.
    pub archetype_matches: Vec<ArchetypeMatch>,
    pub symbols: Vec<SymbolRow>,
    pub relationships: Vec<Relationship>,
    pub linguistic_connections: Vec<LinguisticConnection>,
}

/// One field across all compared entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAlignment {
    /// One slot per entity; `None` where the field is absent.
    pub values: Vec<Option<Value>>,
    /// Every value has the same runtime kind. Absence is its own kind.
    pub aligned: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SimilarityKind {
    SharedDomains,
    SharedAttributes,
    SharedSymbols,
    SameRole,
}

impl SimilarityKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::SharedDomains => "Shared Domains",
            Self::SharedAttributes => "Shared Attributes",
            Self::SharedSymbols => "Shared Symbols",
            Self::SameRole => "Same Role",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Similarity {
    pub kind: SimilarityKind,
    pub label: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Difference {
    /// More than one tradition among the compared entities.
    #[serde(rename_all = "camelCase")]
    Mythology { values: Vec<String> },
    /// Attributes no other compared entity carries.
    #[serde(rename_all = "camelCase")]
    UniqueAttributes {
        entity_id: String,
        entity_name: String,
        attributes: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalContext {
    pub entities: Vec<EntityContext>,
    pub temporal: TemporalSpread,
    pub geographic: GeographicSpread,
    pub connections: Vec<CulturalConnection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityContext {
    pub entity_id: String,
    pub mythology: Option<String>,
    pub culture: Option<String>,
    pub period: Option<String>,
    pub geography: Option<String>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TemporalSpread {
    Unknown,
    SamePeriod { period: String },
    MultiplePeriods { periods: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GeographicSpread {
    Unknown,
    SameRegion { region: String },
    Spread { regions: Vec<String> },
}

/// Two or more compared entities from mythologies in one cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalConnection {
    pub cluster: String,
    pub entity_ids: Vec<String>,
    pub mythologies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeMatch {
    pub archetype_id: ArchetypeId,
    pub archetype_name: String,
    pub entity_names: Vec<String>,
    /// Mean hit count of the matching entities.
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolRow {
    pub entity_id: String,
    /// Symbol as written on the entity.
    pub symbol: String,
    /// Table key it resolved to.
    pub key: String,
    pub symbolism: String,
    /// Reading specific to the entity's mythology, when the table has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cultural_meaning: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Direct,
    Shared,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    pub entities: [String; 2],
    pub description: String,
    /// Related ids common to both, for `shared`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shared: Vec<String>,
}

/// Names of 2+ compared entities descending from one root.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinguisticConnection {
    pub root: String,
    pub meaning: String,
    pub entity_names: Vec<String>,
}

// ============================================================================
// Construction
// ============================================================================

const SHARED_LIST_FIELDS: [(&str, SimilarityKind); 3] = [
    ("domains", SimilarityKind::SharedDomains),
    ("attributes", SimilarityKind::SharedAttributes),
    ("symbols", SimilarityKind::SharedSymbols),
];

impl Comparison {
    /// Compare already-resolved entities.
    pub fn build(entities: Vec<Entity>, tables: &ReferenceTables, matcher: &ArchetypeMatcher) -> Self {
        Self {
            fields: align_fields(&entities),
            similarities: similarities(&entities),
            differences: differences(&entities),
            cultural_context: cultural_context(&entities, tables),
            archetype_matches: archetype_matches(&entities, tables, matcher),
            symbols: symbol_rows(&entities, tables),
            relationships: relationships(&entities),
            linguistic_connections: linguistic_connections(&entities, tables),
            entities,
        }
    }

    pub fn similarity(&self, kind: SimilarityKind) -> Option<&Similarity> {
        self.similarities.iter().find(|s| s.kind == kind)
    }
}

fn align_fields(entities: &[Entity]) -> IndexMap<String, FieldAlignment> {
    let mut names: IndexSet<&str> = IndexSet::new();
    for entity in entities {
        names.extend(
            entity
                .fields
                .keys()
                .map(String::as_str)
                .filter(|name| !RESERVED_FIELDS.contains(name)),
        );
    }

    names
        .into_iter()
        .map(|name| {
            let values: Vec<Option<Value>> = entities.iter().map(|e| e.field(name).cloned()).collect();
            let first = ValueKind::of(values.first().and_then(Option::as_ref));
            let aligned = values.iter().all(|v| ValueKind::of(v.as_ref()) == first);
            (name.to_string(), FieldAlignment { values, aligned })
        })
        .collect()
}

fn lowercase_set<'a>(items: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    items.into_iter().map(|item| item.trim().to_lowercase()).filter(|item| !item.is_empty()).collect()
}

fn similarities(entities: &[Entity]) -> Vec<Similarity> {
    let mut out = Vec::new();

    for (field, kind) in SHARED_LIST_FIELDS {
        let mut sets = entities.iter().map(|e| lowercase_set(e.string_list(field)));
        let Some(first) = sets.next() else {
            continue;
        };
        let shared = sets.fold(first, |acc, set| acc.intersection(&set).cloned().collect());
        if !shared.is_empty() {
            out.push(Similarity {
                kind,
                label: kind.label().to_string(),
                values: shared.into_iter().collect(),
            });
        }
    }

    let roles: Option<Vec<&str>> = entities.iter().map(|e| e.text("role")).collect();
    if let Some(roles) = roles {
        if let Some((first, rest)) = roles.split_first() {
            if rest.iter().all(|role| role == first) {
                out.push(Similarity {
                    kind: SimilarityKind::SameRole,
                    label: SimilarityKind::SameRole.label().to_string(),
                    values: vec![first.to_string()],
                });
            }
        }
    }

    out
}

fn differences(entities: &[Entity]) -> Vec<Difference> {
    let mut out = Vec::new();

    let mythologies: IndexSet<String> = entities.iter().filter_map(Entity::mythology).collect();
    if mythologies.len() > 1 {
        out.push(Difference::Mythology {
            values: mythologies.into_iter().collect(),
        });
    }

    for (index, entity) in entities.iter().enumerate() {
        let others = lowercase_set(
            entities
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != index)
                .flat_map(|(_, e)| e.string_list("attributes")),
        );

        let mut seen = BTreeSet::new();
        let unique: Vec<String> = entity
            .string_list("attributes")
            .into_iter()
            .map(str::trim)
            .filter(|attr| {
                let key = attr.to_lowercase();
                !attr.is_empty() && !others.contains(&key) && seen.insert(key)
            })
            .map(str::to_string)
            .collect();

        if !unique.is_empty() {
            out.push(Difference::UniqueAttributes {
                entity_id: entity.id.clone(),
                entity_name: entity.display_name().to_string(),
                attributes: unique,
            });
        }
    }

    out
}

fn sources(entity: &Entity) -> Vec<String> {
    match entity.field("sources") {
        Some(Value::String(source)) if !source.trim().is_empty() => vec![source.trim().to_string()],
        Some(Value::Array(_)) => entity.string_list("sources").into_iter().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

fn cultural_context(entities: &[Entity], tables: &ReferenceTables) -> CulturalContext {
    let contexts: Vec<EntityContext> = entities
        .iter()
        .map(|e| EntityContext {
            entity_id: e.id.clone(),
            mythology: e.first_text(&["mythology", "tradition"]).map(str::to_string),
            culture: e.first_text(&["culture", "mythology"]).map(str::to_string),
            period: e.first_text(&["period", "historicalPeriod"]).map(str::to_string),
            geography: e.first_text(&["geography", "region", "location"]).map(str::to_string),
            sources: sources(e),
        })
        .collect();

    let periods: IndexSet<&str> = contexts.iter().filter_map(|c| c.period.as_deref()).collect();
    let temporal = match periods.len() {
        0 => TemporalSpread::Unknown,
        1 => TemporalSpread::SamePeriod {
            period: periods[0].to_string(),
        },
        _ => TemporalSpread::MultiplePeriods {
            periods: periods.iter().map(|p| p.to_string()).collect(),
        },
    };

    let regions: IndexSet<&str> = contexts.iter().filter_map(|c| c.geography.as_deref()).collect();
    let geographic = match regions.len() {
        0 => GeographicSpread::Unknown,
        1 => GeographicSpread::SameRegion {
            region: regions[0].to_string(),
        },
        _ => GeographicSpread::Spread {
            regions: regions.iter().map(|r| r.to_string()).collect(),
        },
    };

    let connections = tables
        .cultural_clusters()
        .iter()
        .filter_map(|cluster| {
            let members: Vec<(&str, String)> = entities
                .iter()
                .filter_map(|e| e.mythology().map(|m| (e.id.as_str(), m)))
                .filter(|(_, mythology)| cluster.contains(mythology))
                .collect();
            if members.len() < 2 {
                return None;
            }
            let mythologies: IndexSet<String> = members.iter().map(|(_, m)| m.clone()).collect();
            Some(CulturalConnection {
                cluster: cluster.name.clone(),
                entity_ids: members.iter().map(|(id, _)| id.to_string()).collect(),
                mythologies: mythologies.into_iter().collect(),
            })
        })
        .collect();

    CulturalContext {
        entities: contexts,
        temporal,
        geographic,
        connections,
    }
}

fn archetype_matches(
    entities: &[Entity],
    tables: &ReferenceTables,
    matcher: &ArchetypeMatcher,
) -> Vec<ArchetypeMatch> {
    let mut matches: Vec<ArchetypeMatch> = tables
        .archetypes()
        .iter()
        .filter_map(|archetype| {
            let matching: Vec<&Entity> = entities.iter().filter(|e| matcher.matches(e, archetype)).collect();
            if matching.len() < 2 {
                return None;
            }
            Some(ArchetypeMatch {
                archetype_id: archetype.id.clone(),
                archetype_name: archetype.name.clone(),
                entity_names: matching.iter().map(|e| e.display_name().to_string()).collect(),
                score: matcher.score(matching.iter().copied(), archetype),
            })
        })
        .collect();

    // stable: equal scores keep table order
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches
}

fn symbol_rows(entities: &[Entity], tables: &ReferenceTables) -> Vec<SymbolRow> {
    let mut rows = Vec::new();
    for entity in entities {
        let mythology = entity.mythology();
        for raw in entity.string_list("symbols") {
            let Some(symbol) = tables.symbol(raw) else {
                continue;
            };
            let cultural_meaning = mythology.as_deref().and_then(|m| {
                symbol
                    .cultures
                    .iter()
                    .find(|(tradition, _)| tradition.eq_ignore_ascii_case(m))
                    .map(|(_, culture)| culture.meaning.clone())
            });
            rows.push(SymbolRow {
                entity_id: entity.id.clone(),
                symbol: raw.to_string(),
                key: symbol.key.clone(),
                symbolism: symbol.symbolism.clone(),
                cultural_meaning,
            });
        }
    }
    rows
}

fn relationships(entities: &[Entity]) -> Vec<Relationship> {
    let mut out = Vec::new();
    for (i, a) in entities.iter().enumerate() {
        for b in &entities[i + 1..] {
            let a_related = a.related_ids();
            let b_related = b.related_ids();
            let pair = [a.id.clone(), b.id.clone()];

            if a_related.contains(&b.id.as_str()) || b_related.contains(&a.id.as_str()) {
                out.push(Relationship {
                    kind: RelationshipKind::Direct,
                    entities: pair.clone(),
                    description: format!(
                        "{} and {} are directly related",
                        a.display_name(),
                        b.display_name()
                    ),
                    shared: Vec::new(),
                });
            }

            let shared: IndexSet<&str> = a_related.iter().copied().filter(|id| b_related.contains(id)).collect();
            if !shared.is_empty() {
                let shared: Vec<String> = shared.into_iter().map(str::to_string).collect();
                out.push(Relationship {
                    kind: RelationshipKind::Shared,
                    entities: pair,
                    description: format!(
                        "{} and {} share related entities: {}",
                        a.display_name(),
                        b.display_name(),
                        shared.join(", ")
                    ),
                    shared,
                });
            }
        }
    }
    out
}

fn linguistic_connections(entities: &[Entity], tables: &ReferenceTables) -> Vec<LinguisticConnection> {
    tables
        .etymology()
        .iter()
        .filter_map(|root| {
            let names: Vec<String> = entities
                .iter()
                .filter(|e| root.matches_name(e.display_name()) || root.matches_name(&e.id))
                .map(|e| e.display_name().to_string())
                .collect();
            (names.len() >= 2).then(|| LinguisticConnection {
                root: root.root.clone(),
                meaning: root.meaning.clone(),
                entity_names: names,
            })
        })
        .collect()
}
