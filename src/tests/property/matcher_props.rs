//! Property-based tests for the archetype matcher
//!
//! Tests invariants:
//! - Matching is deterministic for both strategies
//! - Hit counts never exceed the vocabulary size
//! - A single entity's score is its hit count
//! - `matches` agrees with the threshold

use proptest::prelude::*;
use serde_json::json;

use crate::core::mythology::{
    Archetype, ArchetypeMatcher, Entity, MatchStrategyKind, MatchingConfig, ReferenceTables,
};
use crate::core::storage::Collection;
use crate::tests::common::entity;

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

/// Words drawn partly from real archetype vocabulary so matches actually occur.
fn arb_word() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("sky".to_string()),
        Just("thunder".to_string()),
        Just("king".to_string()),
        Just("cunning".to_string()),
        Just("mischief".to_string()),
        Just("war".to_string()),
        Just("award".to_string()),
        Just("wisdom".to_string()),
        Just("sun".to_string()),
        "[a-z]{2,10}",
    ]
}

fn arb_entity() -> impl Strategy<Value = Entity> {
    (
        "[A-Za-z ]{0,20}",
        proptest::collection::vec(arb_word(), 0..6),
        proptest::collection::vec(arb_word(), 0..6),
        proptest::collection::vec(arb_word(), 0..4),
    )
        .prop_map(|(name, domains, attributes, symbols)| {
            entity(
                Collection::Deities,
                "generated",
                json!({
                    "name": name,
                    "domains": domains,
                    "attributes": attributes,
                    "symbols": symbols
                }),
            )
        })
}

fn arb_strategy() -> impl Strategy<Value = MatchStrategyKind> {
    prop_oneof![Just(MatchStrategyKind::Substring), Just(MatchStrategyKind::Token)]
}

fn bundled_archetypes() -> Vec<Archetype> {
    ReferenceTables::bundled().archetypes().to_vec()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: calling `matches` twice yields the same answer
    #[test]
    fn prop_matching_is_deterministic(
        entity in arb_entity(),
        strategy in arb_strategy(),
        threshold in 1usize..6
    ) {
        let matcher = ArchetypeMatcher::from_config(&MatchingConfig { strategy, threshold });
        for archetype in bundled_archetypes() {
            prop_assert_eq!(
                matcher.matches(&entity, &archetype),
                matcher.matches(&entity, &archetype)
            );
        }
    }

    /// Property: hit count is bounded by the vocabulary and consistent with `matches`
    #[test]
    fn prop_hits_bounded_and_thresholded(
        entity in arb_entity(),
        strategy in arb_strategy(),
        threshold in 1usize..6
    ) {
        let matcher = ArchetypeMatcher::from_config(&MatchingConfig { strategy, threshold });
        for archetype in bundled_archetypes() {
            let hits = matcher.hit_count(&entity, &archetype);
            prop_assert!(hits <= archetype.vocabulary().len());
            prop_assert_eq!(matcher.matches(&entity, &archetype), hits >= threshold);
        }
    }

    /// Property: the score of a one-entity group is that entity's hit count
    #[test]
    fn prop_single_entity_score_is_hit_count(entity in arb_entity()) {
        let matcher = ArchetypeMatcher::default();
        for archetype in bundled_archetypes() {
            let hits = matcher.hit_count(&entity, &archetype) as f64;
            prop_assert!((matcher.score([&entity], &archetype) - hits).abs() < f64::EPSILON);
        }
    }

    /// Property: group score lies between the smallest and largest member hit count
    #[test]
    fn prop_group_score_is_bounded(a in arb_entity(), b in arb_entity()) {
        let matcher = ArchetypeMatcher::default();
        for archetype in bundled_archetypes() {
            let ha = matcher.hit_count(&a, &archetype) as f64;
            let hb = matcher.hit_count(&b, &archetype) as f64;
            let score = matcher.score([&a, &b], &archetype);
            prop_assert!(score >= ha.min(hb) - f64::EPSILON);
            prop_assert!(score <= ha.max(hb) + f64::EPSILON);
        }
    }
}
