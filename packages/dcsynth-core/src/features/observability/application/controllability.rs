use crate::errors::{Result, SynthesisError};
use crate::features::automaton::{Automaton, TransitionData};
use tracing::debug;

impl Automaton {
    /// Reachable BAD transitions whose event no controller can disable
    pub fn uncontrollable_bad_transitions(&self) -> Result<Vec<TransitionData>> {
        if self.initial_state_id().is_none() {
            return Err(SynthesisError::operation_failed(
                "controllability test needs an initial state",
            ));
        }
        let reachable = self.accessible_state_ids();
        let mut offending = Vec::new();
        for data in self.bad_transitions() {
            if !reachable.contains(&data.initial_state_id) {
                continue;
            }
            let controllable = self
                .event(data.event_id)
                .is_some_and(|e| e.is_controllable());
            if !controllable {
                offending.push(*data);
            }
        }
        Ok(offending)
    }

    /// True iff every reachable BAD transition is controllable by some controller
    pub fn test_controllability(&self) -> Result<bool> {
        let offending = self.uncontrollable_bad_transitions()?;
        debug!(uncontrollable = offending.len(), "controllability tested");
        Ok(offending.is_empty())
    }
}
