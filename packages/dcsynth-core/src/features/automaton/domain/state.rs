/*
 * State
 *
 * Outgoing transitions are kept in insertion order. Per-event annotation
 * sets (enablement / disablement / illegal configuration) are filled in by
 * the composition engine and the inference analysis.
 *
 * Invariant: enablement_events ∩ disablement_events = ∅
 */

use super::transition::Transition;
use crate::errors::{Result, SynthesisError};
use crate::shared::models::{EventId, StateId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub label: String,
    pub marked: bool,
    transitions: Vec<Transition>,
    enablement_events: BTreeSet<EventId>,
    disablement_events: BTreeSet<EventId>,
    illegal_config_events: BTreeSet<EventId>,
}

impl State {
    pub fn new(id: StateId, label: impl Into<String>, marked: bool) -> Self {
        Self {
            id,
            label: label.into(),
            marked,
            transitions: Vec::new(),
            enablement_events: BTreeSet::new(),
            disablement_events: BTreeSet::new(),
            illegal_config_events: BTreeSet::new(),
        }
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Targets reached on `event` (several when nondeterministic)
    pub fn targets(&self, event: EventId) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .iter()
            .filter(move |t| t.event_id == event)
            .map(|t| t.target_state_id)
    }

    pub fn has_event(&self, event: EventId) -> bool {
        self.transitions.iter().any(|t| t.event_id == event)
    }

    pub fn has_transition(&self, event: EventId, target: StateId) -> bool {
        self.transitions
            .iter()
            .any(|t| t.event_id == event && t.target_state_id == target)
    }

    pub fn enablement_events(&self) -> &BTreeSet<EventId> {
        &self.enablement_events
    }

    pub fn disablement_events(&self) -> &BTreeSet<EventId> {
        &self.disablement_events
    }

    pub fn illegal_config_events(&self) -> &BTreeSet<EventId> {
        &self.illegal_config_events
    }

    /// Returns false when the transition was already present
    pub(crate) fn add_transition(&mut self, transition: Transition) -> bool {
        if self.transitions.contains(&transition) {
            return false;
        }
        self.transitions.push(transition);
        true
    }

    pub(crate) fn remove_transition(&mut self, transition: &Transition) -> bool {
        let before = self.transitions.len();
        self.transitions.retain(|t| t != transition);
        self.transitions.len() != before
    }

    pub(crate) fn mark_enablement(&mut self, event: EventId) -> Result<()> {
        if self.disablement_events.contains(&event) {
            return Err(SynthesisError::operation_failed(format!(
                "event {} is already a disablement event of state '{}'",
                event, self.label
            )));
        }
        self.enablement_events.insert(event);
        Ok(())
    }

    pub(crate) fn mark_disablement(&mut self, event: EventId) -> Result<()> {
        if self.enablement_events.contains(&event) {
            return Err(SynthesisError::operation_failed(format!(
                "event {} is already an enablement event of state '{}'",
                event, self.label
            )));
        }
        self.disablement_events.insert(event);
        Ok(())
    }

    pub(crate) fn mark_illegal_config(&mut self, event: EventId) {
        self.illegal_config_events.insert(event);
    }

    pub(crate) fn clear_illegal_configs(&mut self) {
        self.illegal_config_events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_deduplicated() {
        let mut state = State::new(1, "q0", false);
        assert!(state.add_transition(Transition::new(1, 2)));
        assert!(!state.add_transition(Transition::new(1, 2)));
        assert!(state.add_transition(Transition::new(1, 3)));

        assert_eq!(state.targets(1).collect::<Vec<_>>(), vec![2, 3]);
        assert!(state.remove_transition(&Transition::new(1, 2)));
        assert!(!state.has_transition(1, 2));
    }

    #[test]
    fn test_enablement_disablement_disjoint() {
        let mut state = State::new(1, "q0", false);
        state.mark_enablement(4).unwrap();
        assert!(state.mark_disablement(4).is_err());
        state.mark_disablement(5).unwrap();
        assert!(state.mark_enablement(5).is_err());
    }
}
