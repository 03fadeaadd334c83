/*
 * Automaton Graph Store
 *
 * Directed labeled multigraph over states and events with N controllers.
 *
 * Storage:
 * - states / events: BTreeMap keyed by ID (deterministic iteration order)
 * - label indices: FxHashMap label -> ID
 * - BAD transitions: set of triples
 *
 * IDs are minted from monotonically increasing counters starting at 1, so
 * sub-automata (accessible part, pruned structures) keep their parent's IDs.
 *
 * # Time Complexity
 * - add_state / add_event: O(1) (hash lookup)
 * - add_transition: O(out-degree of source)
 * - to_graph: O(states + transitions)
 */

use super::event::{Event, EventAdded};
use super::state::State;
use super::transition::{Transition, TransitionData};
use crate::errors::{Result, SynthesisError};
use crate::shared::models::{EventId, StateId, NO_STATE};
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Automaton {
    n_controllers: usize,
    states: BTreeMap<StateId, State>,
    events: BTreeMap<EventId, Event>,
    state_index: FxHashMap<String, StateId>,
    event_index: FxHashMap<String, EventId>,
    initial_state_id: StateId,
    next_state_id: StateId,
    next_event_id: EventId,
    bad_transitions: BTreeSet<TransitionData>,
}

impl Automaton {
    pub fn new(n_controllers: usize) -> Self {
        Self {
            n_controllers,
            states: BTreeMap::new(),
            events: BTreeMap::new(),
            state_index: FxHashMap::default(),
            event_index: FxHashMap::default(),
            initial_state_id: NO_STATE,
            next_state_id: 1,
            next_event_id: 1,
            bad_transitions: BTreeSet::new(),
        }
    }

    /// Empty automaton sharing this one's controllers and events
    pub(crate) fn with_same_events(&self) -> Self {
        let mut empty = Self::new(self.n_controllers);
        empty.events = self.events.clone();
        empty.event_index = self.event_index.clone();
        empty.next_event_id = self.next_event_id;
        empty.next_state_id = self.next_state_id;
        empty
    }

    pub fn n_controllers(&self) -> usize {
        self.n_controllers
    }

    // ========================================================================
    // States
    // ========================================================================

    pub fn add_state(
        &mut self,
        label: impl Into<String>,
        marked: bool,
        is_initial: bool,
    ) -> Result<StateId> {
        let label = label.into();
        if self.state_index.contains_key(&label) {
            return Err(SynthesisError::DuplicateStateLabel(label));
        }

        let id = self.next_state_id;
        self.next_state_id += 1;
        self.state_index.insert(label.clone(), id);
        self.states.insert(id, State::new(id, label, marked));
        if is_initial {
            self.initial_state_id = id;
        }
        Ok(id)
    }

    pub fn set_initial_state(&mut self, id: StateId) -> Result<()> {
        if !self.states.contains_key(&id) {
            return Err(SynthesisError::UnknownState(id));
        }
        self.initial_state_id = id;
        Ok(())
    }

    pub fn initial_state_id(&self) -> Option<StateId> {
        (self.initial_state_id != NO_STATE).then_some(self.initial_state_id)
    }

    pub fn initial_state(&self) -> Option<&State> {
        self.states.get(&self.initial_state_id)
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(&id)
    }

    pub(crate) fn state_mut(&mut self, id: StateId) -> Option<&mut State> {
        self.states.get_mut(&id)
    }

    pub fn state_id(&self, label: &str) -> Option<StateId> {
        self.state_index.get(label).copied()
    }

    pub fn state_by_label(&self, label: &str) -> Option<&State> {
        self.state_id(label).and_then(|id| self.states.get(&id))
    }

    /// States in ID order
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }

    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states.keys().copied()
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Register an event label.
    ///
    /// Idempotent for identical flags; conflicting flags for an existing
    /// label are an error.
    pub fn add_event(
        &mut self,
        label: impl Into<String>,
        observable: &[bool],
        controllable: &[bool],
    ) -> Result<EventAdded> {
        let label = label.into();
        if observable.len() != self.n_controllers || controllable.len() != self.n_controllers {
            return Err(SynthesisError::operation_failed(format!(
                "event '{}' needs {} observability and controllability flags",
                label, self.n_controllers
            )));
        }

        if let Some(&id) = self.event_index.get(&label) {
            let existing = &self.events[&id];
            if existing.same_flags(observable, controllable) {
                return Ok(EventAdded::Existing(id));
            }
            return Err(SynthesisError::EventConflict { label });
        }

        let id = self.next_event_id;
        self.next_event_id += 1;
        self.event_index.insert(label.clone(), id);
        self.events.insert(
            id,
            Event::new(id, label, observable.to_vec(), controllable.to_vec()),
        );
        Ok(EventAdded::New(id))
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.get(&id)
    }

    pub fn event_id(&self, label: &str) -> Option<EventId> {
        self.event_index.get(label).copied()
    }

    pub fn event_by_label(&self, label: &str) -> Option<&Event> {
        self.event_id(label).and_then(|id| self.events.get(&id))
    }

    /// Events in ID order
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub fn n_events(&self) -> usize {
        self.events.len()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Returns false when the transition already existed
    pub fn add_transition(&mut self, from: StateId, event: EventId, to: StateId) -> Result<bool> {
        if !self.events.contains_key(&event) {
            return Err(SynthesisError::UnknownEvent(event));
        }
        if !self.states.contains_key(&to) {
            return Err(SynthesisError::UnknownState(to));
        }
        let source = self
            .states
            .get_mut(&from)
            .ok_or(SynthesisError::UnknownState(from))?;
        Ok(source.add_transition(Transition::new(event, to)))
    }

    /// Add a transition and flag it BAD
    pub fn add_bad_transition(&mut self, from: StateId, event: EventId, to: StateId) -> Result<()> {
        self.add_transition(from, event, to)?;
        self.bad_transitions
            .insert(TransitionData::new(from, event, to));
        Ok(())
    }

    /// Flag an existing transition BAD
    pub fn mark_bad(&mut self, data: TransitionData) -> Result<()> {
        if !self.has_transition(&data) {
            return Err(SynthesisError::operation_failed(format!(
                "no transition {} to mark BAD",
                data
            )));
        }
        self.bad_transitions.insert(data);
        Ok(())
    }

    pub(crate) fn remove_transition(&mut self, data: &TransitionData) -> bool {
        self.bad_transitions.remove(data);
        self.states
            .get_mut(&data.initial_state_id)
            .map_or(false, |s| s.remove_transition(&data.edge()))
    }

    pub fn has_transition(&self, data: &TransitionData) -> bool {
        self.states
            .get(&data.initial_state_id)
            .map_or(false, |s| s.has_transition(data.event_id, data.target_state_id))
    }

    /// Targets of `event` from `state`; empty for unknown states
    pub fn targets(&self, state: StateId, event: EventId) -> Vec<StateId> {
        self.states
            .get(&state)
            .map(|s| s.targets(event).collect())
            .unwrap_or_default()
    }

    /// All transitions, by source ID then insertion order
    pub fn transitions(&self) -> impl Iterator<Item = TransitionData> + '_ {
        self.states.values().flat_map(|s| {
            s.transitions()
                .iter()
                .map(move |t| TransitionData::new(s.id, t.event_id, t.target_state_id))
        })
    }

    pub fn n_transitions(&self) -> usize {
        self.states.values().map(|s| s.transitions().len()).sum()
    }

    pub fn is_bad(&self, data: &TransitionData) -> bool {
        self.bad_transitions.contains(data)
    }

    pub fn bad_transitions(&self) -> impl Iterator<Item = &TransitionData> {
        self.bad_transitions.iter()
    }

    // ========================================================================
    // Sub-automata and views
    // ========================================================================

    /// Copy restricted to `keep`, preserving IDs, labels and events.
    /// The initial state is dropped when it is not kept.
    pub(crate) fn restricted_to(&self, keep: &FxHashSet<StateId>) -> Automaton {
        let mut result = self.with_same_events();
        for state in self.states.values().filter(|s| keep.contains(&s.id)) {
            let mut copy = state.clone();
            for t in state.transitions() {
                if !keep.contains(&t.target_state_id) {
                    copy.remove_transition(t);
                }
            }
            result.state_index.insert(copy.label.clone(), copy.id);
            result.states.insert(copy.id, copy);
        }
        if keep.contains(&self.initial_state_id) {
            result.initial_state_id = self.initial_state_id;
        }
        result.bad_transitions = self
            .bad_transitions
            .iter()
            .filter(|d| keep.contains(&d.initial_state_id) && keep.contains(&d.target_state_id))
            .copied()
            .collect();
        result
    }

    /// Read-only petgraph view: node weights are state IDs, edge weights
    /// event IDs. The map resolves state IDs to node indices.
    pub fn to_graph(&self) -> (DiGraph<StateId, EventId>, FxHashMap<StateId, NodeIndex>) {
        let mut graph = DiGraph::with_capacity(self.n_states(), self.n_transitions());
        let mut index = FxHashMap::default();
        for &id in self.states.keys() {
            index.insert(id, graph.add_node(id));
        }
        for data in self.transitions() {
            let (Some(&from), Some(&to)) = (
                index.get(&data.initial_state_id),
                index.get(&data.target_state_id),
            ) else {
                continue;
            };
            graph.add_edge(from, to, data.event_id);
        }
        (graph, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_state() -> Automaton {
        let mut a = Automaton::new(1);
        let q0 = a.add_state("q0", true, true).unwrap();
        let q1 = a.add_state("q1", false, false).unwrap();
        let e = a.add_event("a", &[true], &[false]).unwrap().id();
        a.add_transition(q0, e, q1).unwrap();
        a
    }

    #[test]
    fn test_ids_start_at_one() {
        let a = two_state();
        assert_eq!(a.state_id("q0"), Some(1));
        assert_eq!(a.state_id("q1"), Some(2));
        assert_eq!(a.event_id("a"), Some(1));
        assert_eq!(a.initial_state_id(), Some(1));
    }

    #[test]
    fn test_duplicate_state_label() {
        let mut a = two_state();
        assert!(matches!(
            a.add_state("q0", false, false),
            Err(SynthesisError::DuplicateStateLabel(_))
        ));
    }

    #[test]
    fn test_add_event_idempotent() {
        let mut a = two_state();
        assert_eq!(
            a.add_event("a", &[true], &[false]).unwrap(),
            EventAdded::Existing(1)
        );
        assert!(matches!(
            a.add_event("a", &[false], &[false]),
            Err(SynthesisError::EventConflict { .. })
        ));
        assert!(a.add_event("b", &[true, true], &[false, false]).is_err());
        assert!(a.add_event("b", &[true], &[true]).unwrap().is_new());
    }

    #[test]
    fn test_add_transition_unknown_ids() {
        let mut a = two_state();
        assert!(matches!(
            a.add_transition(1, 9, 2),
            Err(SynthesisError::UnknownEvent(9))
        ));
        assert!(matches!(
            a.add_transition(7, 1, 2),
            Err(SynthesisError::UnknownState(7))
        ));
        assert!(!a.add_transition(1, 1, 2).unwrap());
        assert_eq!(a.n_transitions(), 1);
    }

    #[test]
    fn test_bad_transitions() {
        let mut a = two_state();
        let data = TransitionData::new(1, 1, 2);
        assert!(!a.is_bad(&data));
        a.mark_bad(data).unwrap();
        assert!(a.is_bad(&data));
        assert!(a.mark_bad(TransitionData::new(2, 1, 1)).is_err());

        assert!(a.remove_transition(&data));
        assert!(!a.is_bad(&data));
        assert_eq!(a.n_transitions(), 0);
    }

    #[test]
    fn test_to_graph() {
        let a = two_state();
        let (graph, index) = a.to_graph();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph[index[&1]], 1);
    }

    #[test]
    fn test_restricted_keeps_ids() {
        let mut a = two_state();
        a.add_state("q2", false, false).unwrap();
        let keep: FxHashSet<StateId> = [1, 3].into_iter().collect();
        let sub = a.restricted_to(&keep);

        assert_eq!(sub.n_states(), 2);
        assert_eq!(sub.state_id("q2"), Some(3));
        assert_eq!(sub.n_transitions(), 0);
        assert_eq!(sub.initial_state_id(), Some(1));
        assert_eq!(sub.n_events(), 1);
    }
}
