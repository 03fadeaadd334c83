/*
 * Automaton Operations
 *
 * Every operation builds a new automaton; inputs are never modified.
 *
 * - accessible: states reachable from the initial state (forward BFS)
 * - coaccessible: states that reach a marked state (reverse BFS on the
 *   petgraph view)
 * - trim: accessible, then coaccessible
 * - complement: invert marking and complete with a marked dump state
 * - intersection: synchronous product over shared event labels
 * - union: parallel composition (shared labels synchronize, private
 *   labels interleave)
 *
 * Product states are labelled "<first>_<second>", marked when both
 * components are marked; a product transition is BAD when either
 * component transition is BAD.
 *
 * # Time Complexity
 * - accessible / coaccessible / trim: O(states + transitions)
 * - complement: O(states × events)
 * - intersection / union: O(|Q1| × |Q2| × |Σ|) in the worst case
 */

use crate::errors::{Result, SynthesisError};
use crate::features::automaton::domain::{Automaton, TransitionData};
use crate::shared::models::{EventId, StateId};
use petgraph::graph::NodeIndex;
use petgraph::visit::{Bfs, Reversed, VisitMap};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use tracing::debug;

/// Label of the completion state added by `complement`
pub const DUMP_STATE_LABEL: &str = "Dump State";

impl Automaton {
    /// IDs of states reachable from the initial state
    pub fn accessible_state_ids(&self) -> FxHashSet<StateId> {
        let mut seen = FxHashSet::default();
        let Some(initial) = self.initial_state_id() else {
            return seen;
        };

        let mut frontier = VecDeque::from([initial]);
        seen.insert(initial);
        while let Some(id) = frontier.pop_front() {
            let Some(state) = self.state(id) else {
                continue;
            };
            for t in state.transitions() {
                if seen.insert(t.target_state_id) {
                    frontier.push_back(t.target_state_id);
                }
            }
        }
        seen
    }

    /// Part reachable from the initial state (empty without one)
    pub fn accessible(&self) -> Automaton {
        self.restricted_to(&self.accessible_state_ids())
    }

    /// Part that can reach a marked state
    pub fn coaccessible(&self) -> Automaton {
        let (graph, index) = self.to_graph();
        let reversed = Reversed(&graph);

        let marked: Vec<NodeIndex> = self
            .states()
            .filter(|s| s.marked)
            .filter_map(|s| index.get(&s.id).copied())
            .collect();

        let mut keep = FxHashSet::default();
        if let Some((&first, rest)) = marked.split_first() {
            let mut bfs = Bfs::new(reversed, first);
            for &node in rest {
                if bfs.discovered.visit(node) {
                    bfs.stack.push_back(node);
                }
            }
            while let Some(node) = bfs.next(reversed) {
                keep.insert(graph[node]);
            }
        }
        self.restricted_to(&keep)
    }

    /// Accessible and coaccessible part
    pub fn trim(&self) -> Automaton {
        self.accessible().coaccessible()
    }

    /// Invert markings and complete every state/event pair with a
    /// transition to a marked dump state.
    pub fn complement(&self) -> Result<Automaton> {
        if self.state_id(DUMP_STATE_LABEL).is_some() {
            return Err(SynthesisError::operation_failed(format!(
                "automaton already contains a '{}'",
                DUMP_STATE_LABEL
            )));
        }

        let mut result = self.clone();
        let ids: Vec<StateId> = result.state_ids().collect();
        for &id in &ids {
            if let Some(state) = result.state_mut(id) {
                state.marked = !state.marked;
            }
        }

        let dump = result.add_state(DUMP_STATE_LABEL, true, false)?;
        let events: Vec<EventId> = result.events().map(|e| e.id).collect();
        let mut added = 0usize;
        for id in ids.into_iter().chain(std::iter::once(dump)) {
            for &event in &events {
                let missing = result.state(id).map_or(false, |s| !s.has_event(event));
                if missing {
                    result.add_transition(id, event, dump)?;
                    added += 1;
                }
            }
        }

        debug!(added, "complement completed with dump state");
        Ok(result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProductKind {
    Intersection,
    Union,
}

impl ProductKind {
    fn name(self) -> &'static str {
        match self {
            Self::Intersection => "intersection",
            Self::Union => "union",
        }
    }
}

/// Synchronous product over the labels both automata share
pub fn intersection(first: &Automaton, second: &Automaton) -> Result<Automaton> {
    product(first, second, ProductKind::Intersection)
}

/// Parallel composition: shared labels synchronize, private labels interleave
pub fn union(first: &Automaton, second: &Automaton) -> Result<Automaton> {
    product(first, second, ProductKind::Union)
}

fn check_compatible(first: &Automaton, second: &Automaton) -> Result<()> {
    if first.n_controllers() != second.n_controllers() {
        return Err(SynthesisError::incompatible(format!(
            "{} controllers vs {} controllers",
            first.n_controllers(),
            second.n_controllers()
        )));
    }
    for event in first.events() {
        if let Some(other) = second.event_by_label(&event.label) {
            if !other.same_flags(&event.observable, &event.controllable) {
                return Err(SynthesisError::incompatible(format!(
                    "event '{}' has different observability/controllability",
                    event.label
                )));
            }
        }
    }
    Ok(())
}

type Pair = (StateId, StateId);

struct ProductBuilder<'a> {
    first: &'a Automaton,
    second: &'a Automaton,
    result: Automaton,
    index: FxHashMap<Pair, StateId>,
    frontier: VecDeque<Pair>,
}

impl<'a> ProductBuilder<'a> {
    fn intern(&mut self, pair: Pair, is_initial: bool) -> Result<StateId> {
        if let Some(&id) = self.index.get(&pair) {
            return Ok(id);
        }
        let a = self
            .first
            .state(pair.0)
            .ok_or(SynthesisError::UnknownState(pair.0))?;
        let b = self
            .second
            .state(pair.1)
            .ok_or(SynthesisError::UnknownState(pair.1))?;

        let id = self.result.add_state(
            format!("{}_{}", a.label, b.label),
            a.marked && b.marked,
            is_initial,
        )?;
        self.index.insert(pair, id);
        self.frontier.push_back(pair);
        Ok(id)
    }
}

fn product(first: &Automaton, second: &Automaton, kind: ProductKind) -> Result<Automaton> {
    check_compatible(first, second)?;
    let (Some(initial_first), Some(initial_second)) =
        (first.initial_state_id(), second.initial_state_id())
    else {
        return Err(SynthesisError::NoInitialState(format!(
            "{} requires an initial state in both automata",
            kind.name()
        )));
    };

    let mut result = Automaton::new(first.n_controllers());

    // (product event, first's event, second's event); None = that side stays
    let mut moves: Vec<(EventId, Option<EventId>, Option<EventId>)> = Vec::new();
    for event in first.events() {
        let other = second.event_id(&event.label);
        if other.is_none() && kind == ProductKind::Intersection {
            continue;
        }
        let id = result
            .add_event(event.label.clone(), &event.observable, &event.controllable)?
            .id();
        moves.push((id, Some(event.id), other));
    }
    if kind == ProductKind::Union {
        for event in second.events() {
            if first.event_id(&event.label).is_some() {
                continue;
            }
            let id = result
                .add_event(event.label.clone(), &event.observable, &event.controllable)?
                .id();
            moves.push((id, None, Some(event.id)));
        }
    }

    let mut builder = ProductBuilder {
        first,
        second,
        result,
        index: FxHashMap::default(),
        frontier: VecDeque::new(),
    };
    builder.intern((initial_first, initial_second), true)?;

    while let Some((s1, s2)) = builder.frontier.pop_front() {
        let source = builder.index[&(s1, s2)];
        for &(event, e1, e2) in &moves {
            let targets1 = e1.map_or_else(|| vec![s1], |e| first.targets(s1, e));
            let targets2 = e2.map_or_else(|| vec![s2], |e| second.targets(s2, e));

            for &t1 in &targets1 {
                for &t2 in &targets2 {
                    let target = builder.intern((t1, t2), false)?;
                    builder.result.add_transition(source, event, target)?;

                    let bad = e1.map_or(false, |e| first.is_bad(&TransitionData::new(s1, e, t1)))
                        || e2.map_or(false, |e| second.is_bad(&TransitionData::new(s2, e, t2)));
                    if bad {
                        builder
                            .result
                            .mark_bad(TransitionData::new(source, event, target))?;
                    }
                }
            }
        }
    }

    debug!(
        kind = kind.name(),
        states = builder.result.n_states(),
        transitions = builder.result.n_transitions(),
        "product built"
    );
    Ok(builder.result)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// q0 -a-> q1 -b-> q2(marked), q3 unreachable, q4 reachable dead end
    fn chain() -> Automaton {
        let mut a = Automaton::new(1);
        let q0 = a.add_state("q0", false, true).unwrap();
        let q1 = a.add_state("q1", false, false).unwrap();
        let q2 = a.add_state("q2", true, false).unwrap();
        let q3 = a.add_state("q3", true, false).unwrap();
        let q4 = a.add_state("q4", false, false).unwrap();
        let ea = a.add_event("a", &[true], &[true]).unwrap().id();
        let eb = a.add_event("b", &[true], &[true]).unwrap().id();
        a.add_transition(q0, ea, q1).unwrap();
        a.add_transition(q1, eb, q2).unwrap();
        a.add_transition(q3, ea, q2).unwrap();
        a.add_transition(q0, eb, q4).unwrap();
        a
    }

    fn labels(a: &Automaton) -> Vec<String> {
        a.states().map(|s| s.label.clone()).collect()
    }

    #[test]
    fn test_accessible() {
        let acc = chain().accessible();
        assert_eq!(labels(&acc), vec!["q0", "q1", "q2", "q4"]);
        assert_eq!(acc.n_transitions(), 3);
    }

    #[test]
    fn test_accessible_without_initial_is_empty() {
        let mut a = Automaton::new(1);
        a.add_state("q0", true, false).unwrap();
        assert_eq!(a.accessible().n_states(), 0);
    }

    #[test]
    fn test_coaccessible() {
        let co = chain().coaccessible();
        assert_eq!(labels(&co), vec!["q0", "q1", "q2", "q3"]);
    }

    #[test]
    fn test_trim_idempotent() {
        let once = chain().trim();
        assert_eq!(labels(&once), vec!["q0", "q1", "q2"]);
        let twice = once.trim();
        assert_eq!(labels(&once), labels(&twice));
        assert_eq!(once.n_transitions(), twice.n_transitions());
    }

    #[test]
    fn test_complement() {
        let a = chain();
        let c = a.complement().unwrap();
        let dump = c.state_by_label(DUMP_STATE_LABEL).unwrap();

        assert!(dump.marked);
        assert!(c.state_by_label("q0").unwrap().marked);
        assert!(!c.state_by_label("q2").unwrap().marked);
        // Every state has every event
        for state in c.states() {
            for event in c.events() {
                assert!(state.has_event(event.id), "{} lacks {}", state.label, event.label);
            }
        }
        assert!(matches!(
            c.complement(),
            Err(SynthesisError::OperationFailed(_))
        ));
    }

    fn single(label: &str, event: &str, observable: bool) -> Automaton {
        let mut a = Automaton::new(1);
        let s0 = a.add_state(format!("{}0", label), true, true).unwrap();
        let s1 = a.add_state(format!("{}1", label), true, false).unwrap();
        let e = a.add_event(event, &[observable], &[false]).unwrap().id();
        a.add_transition(s0, e, s1).unwrap();
        a
    }

    #[test]
    fn test_intersection_shared_events_only() {
        let mut left = single("x", "a", true);
        let lb = left.add_event("b", &[true], &[false]).unwrap().id();
        left.add_transition(1, lb, 1).unwrap();
        let right = single("y", "a", true);

        let product = intersection(&left, &right).unwrap();
        assert_eq!(labels(&product), vec!["x0_y0", "x1_y1"]);
        assert_eq!(product.n_events(), 1);
        assert!(product.state_by_label("x1_y1").unwrap().marked);
    }

    #[test]
    fn test_union_interleaves_private_events() {
        let left = single("x", "a", true);
        let right = single("y", "b", true);

        let product = union(&left, &right).unwrap();
        assert_eq!(product.n_states(), 4);
        assert_eq!(product.n_events(), 2);
        assert_eq!(product.n_transitions(), 4);
    }

    #[test]
    fn test_bad_transitions_propagate() {
        let mut left = single("x", "a", true);
        left.mark_bad(TransitionData::new(1, 1, 2)).unwrap();
        let right = single("y", "a", true);

        let product = intersection(&left, &right).unwrap();
        assert_eq!(product.bad_transitions().count(), 1);
    }

    #[test]
    fn test_incompatible_automata() {
        let left = single("x", "a", true);
        let right = single("y", "a", false);
        assert!(matches!(
            intersection(&left, &right),
            Err(SynthesisError::IncompatibleAutomata(_))
        ));

        let two = Automaton::new(2);
        assert!(matches!(
            union(&left, &two),
            Err(SynthesisError::IncompatibleAutomata(_))
        ));
    }
}
