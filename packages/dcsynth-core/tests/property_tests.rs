//! Property-based tests
//!
//! Invariants that should hold for ALL generated inputs:
//! - Roundtrip: parse(print(x)) == x for label vectors and documents
//! - Determinism: composing the same plant twice gives the same structure
//! - Idempotence: trim(trim(a)) == trim(a)
//! - Soundness: a protocol that solves the control problem is feasible

mod common;

use common::*;
use dcsynth_core::config::ReachabilityPolicy;
use dcsynth_core::{Automaton, AutomatonView, FeasibilityChecker, LabelVector, TextFormat};
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

fn component() -> impl Strategy<Value = String> {
    prop_oneof![Just("*".to_string()), "[a-z][a-z0-9_]{0,5}"]
}

fn flags(n: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), n)
        .prop_map(|bits| bits.into_iter().map(|b| if b { 'T' } else { 'F' }).collect())
}

/// Document for a random two-controller plant over events a, b, c
fn plant_document() -> impl Strategy<Value = String> {
    (1usize..=6)
        .prop_flat_map(|n_states| {
            (
                Just(n_states),
                prop::collection::vec(any::<bool>(), n_states),
                prop::collection::vec((flags(2), flags(2)), 3),
                prop::collection::vec(
                    (1..=n_states, 0usize..3, 1..=n_states, prop::bool::weighted(0.2)),
                    0..12,
                ),
            )
        })
        .prop_map(|(n_states, marked, event_flags, transitions)| {
            let labels = ["a", "b", "c"];
            let mut doc = String::from("[controllers]\n2\n[states]\n");
            for (i, m) in marked.iter().enumerate().take(n_states) {
                let prefix = if i == 0 { "@" } else { "" };
                doc.push_str(&format!("{}{},{}\n", prefix, i + 1, if *m { 'T' } else { 'F' }));
            }
            doc.push_str("[events]\n");
            for (label, (obs, ctl)) in labels.iter().zip(&event_flags) {
                doc.push_str(&format!("{},{},{}\n", label, obs, ctl));
            }
            doc.push_str("[transitions]\n");
            for (from, event, to, bad) in transitions {
                let tag = if bad { ":BAD" } else { "" };
                doc.push_str(&format!("{},{},{}{}\n", from, labels[event], to, tag));
            }
            doc
        })
}

fn document_of(automaton: &Automaton) -> String {
    TextFormat::to_document(automaton)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_label_vector_roundtrip(components in prop::collection::vec(component(), 1..6)) {
        let vector = LabelVector::from_components(components.clone()).unwrap();
        let parsed = LabelVector::parse(&vector.to_string()).unwrap();
        prop_assert_eq!(parsed.components(), &components[..]);
    }

    #[test]
    fn prop_document_roundtrip(doc in plant_document()) {
        let first = TextFormat::parse_document(&doc).unwrap();
        let printed = document_of(&first);
        let second = TextFormat::parse_document(&printed).unwrap();
        prop_assert_eq!(document_of(&second), printed);
        prop_assert_eq!(second.n_transitions(), first.n_transitions());
    }

    #[test]
    fn prop_composition_is_deterministic(doc in plant_document()) {
        let plant = TextFormat::parse_document(&doc).unwrap();
        let a = plant.synchronized_composition().unwrap();
        let b = plant.synchronized_composition().unwrap();
        prop_assert_eq!(a.state_input(), b.state_input());
        prop_assert_eq!(a.transition_input(), b.transition_input());
        prop_assert_eq!(a.unconditional_violations(), b.unconditional_violations());
    }

    #[test]
    fn prop_communications_target_existing_states(doc in plant_document()) {
        let u = TextFormat::parse_document(&doc)
            .unwrap()
            .synchronized_composition()
            .unwrap()
            .add_communications()
            .unwrap();
        for c in u.potential_communications() {
            prop_assert!(u.automaton().has_transition(&c.transition));
            prop_assert!(u.tuple(c.transition.target_state_id).is_some());
        }
    }

    #[test]
    fn prop_trim_is_idempotent(doc in plant_document()) {
        let plant = TextFormat::parse_document(&doc).unwrap();
        let once = plant.trim();
        let twice = once.trim();
        prop_assert_eq!(document_of(&twice), document_of(&once));
    }

    #[test]
    fn prop_solving_protocols_are_feasible(mask in 0u32..256) {
        let u = two_controller_ustructure();
        let candidates = u.candidates();
        let checker = FeasibilityChecker::new(&u, ReachabilityPolicy::ReachableOnly);
        let strict = FeasibilityChecker::new(&u, ReachabilityPolicy::Strict);

        let protocol: Vec<_> = candidates
            .iter()
            .enumerate()
            .filter(|(i, _)| mask >> i & 1 == 1)
            .map(|(_, c)| c.clone())
            .collect();
        if checker.solves_control_problem(&protocol).unwrap() {
            prop_assert!(checker.is_feasible(&protocol).unwrap());
        }
        // Keeping unused candidates can only add reachable violations
        if strict.solves_control_problem(&protocol).unwrap() {
            prop_assert!(checker.solves_control_problem(&protocol).unwrap());
        }
    }
}
