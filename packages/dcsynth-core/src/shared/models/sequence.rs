//! Alternating state/event runs through an automaton

use crate::errors::{Result, SynthesisError};
use crate::shared::models::{EventId, StateId};
use serde::{Deserialize, Serialize};

/// Immutable run `s0 e1 s1 ... en sn`.
///
/// Invariant: `state_ids.len() == event_ids.len() + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    state_ids: Vec<StateId>,
    event_ids: Vec<EventId>,
}

impl Sequence {
    pub fn new(state_ids: Vec<StateId>, event_ids: Vec<EventId>) -> Result<Self> {
        if state_ids.len() != event_ids.len() + 1 {
            return Err(SynthesisError::operation_failed(format!(
                "sequence needs {} states for {} events, got {}",
                event_ids.len() + 1,
                event_ids.len(),
                state_ids.len()
            )));
        }
        Ok(Self {
            state_ids,
            event_ids,
        })
    }

    /// Zero-length run sitting at `state`
    pub fn single(state: StateId) -> Self {
        Self {
            state_ids: vec![state],
            event_ids: Vec::new(),
        }
    }

    /// New run with one more step appended
    pub fn extended(&self, event: EventId, target: StateId) -> Self {
        let mut next = self.clone();
        next.event_ids.push(event);
        next.state_ids.push(target);
        next
    }

    pub fn state_ids(&self) -> &[StateId] {
        &self.state_ids
    }

    pub fn event_ids(&self) -> &[EventId] {
        &self.event_ids
    }

    /// Number of events in the run
    pub fn len(&self) -> usize {
        self.event_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_ids.is_empty()
    }

    pub fn first_state(&self) -> StateId {
        self.state_ids[0]
    }

    pub fn last_state(&self) -> StateId {
        self.state_ids[self.state_ids.len() - 1]
    }

    /// `(source, event, target)` steps
    pub fn steps(&self) -> impl Iterator<Item = (StateId, EventId, StateId)> + '_ {
        self.event_ids
            .iter()
            .enumerate()
            .map(move |(i, &e)| (self.state_ids[i], e, self.state_ids[i + 1]))
    }
}
