//! Property-based tests for comparison construction
//!
//! Tests invariants:
//! - Shared-set similarities don't depend on entity order
//! - Shared values are lowercased and sorted
//! - Every entity is kept, in input order
//! - Each field appears once, with one value slot per entity

use std::collections::BTreeSet;

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use crate::core::mythology::{
    ArchetypeMatcher, Comparison, Entity, ReferenceTables, SimilarityKind,
};
use crate::core::storage::Collection;
use crate::tests::common::entity;

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn arb_term() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("sky".to_string()),
        Just("Sky".to_string()),
        Just("war".to_string()),
        Just("sea".to_string()),
        Just("wisdom".to_string()),
        "[a-zA-Z]{3,8}",
    ]
}

fn arb_entity(id: &'static str) -> impl Strategy<Value = Entity> {
    (
        proptest::collection::vec(arb_term(), 0..5),
        proptest::collection::vec(arb_term(), 0..5),
        prop::option::of("[a-z]{3,8}"),
    )
        .prop_map(move |(domains, attributes, extra)| {
            let mut value = json!({
                "name": id,
                "domains": domains,
                "attributes": attributes
            });
            if let (Some(extra), Value::Object(map)) = (extra, &mut value) {
                map.insert(extra, Value::Bool(true));
            }
            entity(Collection::Deities, id, value)
        })
}

fn build(entities: Vec<Entity>) -> Comparison {
    Comparison::build(entities, &ReferenceTables::default(), &ArchetypeMatcher::default())
}

fn shared(comparison: &Comparison, kind: SimilarityKind) -> Vec<String> {
    comparison
        .similarity(kind)
        .map(|s| s.values.clone())
        .unwrap_or_default()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: compare([A, B]) and compare([B, A]) share the same sets
    #[test]
    fn prop_similarity_is_commutative(a in arb_entity("a"), b in arb_entity("b")) {
        let ab = build(vec![a.clone(), b.clone()]);
        let ba = build(vec![b, a]);

        for kind in [SimilarityKind::SharedDomains, SimilarityKind::SharedAttributes] {
            prop_assert_eq!(shared(&ab, kind), shared(&ba, kind));
        }
    }

    /// Property: shared values are lowercased, sorted and present on every entity
    #[test]
    fn prop_shared_values_sorted_and_common(
        a in arb_entity("a"),
        b in arb_entity("b"),
        c in arb_entity("c")
    ) {
        let entities = vec![a, b, c];
        let comparison = build(entities.clone());
        let values = shared(&comparison, SimilarityKind::SharedDomains);

        let mut sorted = values.clone();
        sorted.sort();
        prop_assert_eq!(&values, &sorted);

        for value in &values {
            prop_assert_eq!(value, &value.to_lowercase());
            for e in &entities {
                let domains: BTreeSet<String> =
                    e.string_list("domains").iter().map(|d| d.to_lowercase()).collect();
                prop_assert!(domains.contains(value));
            }
        }
    }

    /// Property: entities are kept in order and fields are aligned per entity
    #[test]
    fn prop_fields_cover_every_entity(a in arb_entity("a"), b in arb_entity("b")) {
        let comparison = build(vec![a.clone(), b.clone()]);

        let ids: Vec<&str> = comparison.entities.iter().map(|e| e.id.as_str()).collect();
        prop_assert_eq!(ids, vec!["a", "b"]);

        let mut expected: Map<String, Value> = a.fields.clone();
        expected.extend(b.fields.clone());
        prop_assert_eq!(comparison.fields.len(), expected.len());

        for (name, alignment) in &comparison.fields {
            prop_assert_eq!(alignment.values.len(), 2);
            prop_assert_eq!(alignment.values[0].as_ref(), a.field(name));
            prop_assert_eq!(alignment.values[1].as_ref(), b.field(name));
        }
    }
}
