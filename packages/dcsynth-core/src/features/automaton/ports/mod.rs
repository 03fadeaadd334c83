/*
 * Automaton Ports
 *
 * Read-only access shared by Automaton, UStructure and PrunedUStructure.
 * Renderers and persistence adapters depend on this trait only.
 */

use crate::features::automaton::domain::{Automaton, TransitionData};
use crate::features::automaton::infrastructure::TextFormat;

/// Read-only view over an automaton-backed structure
pub trait AutomatonView {
    /// Underlying graph store
    fn automaton(&self) -> &Automaton;

    /// Tags written after a transition by `transition_input`
    fn transition_tags(&self, data: &TransitionData) -> Vec<String> {
        if self.automaton().is_bad(data) {
            vec![TextFormat::BAD_TAG.to_string()]
        } else {
            Vec::new()
        }
    }

    /// `label,T|F` per state, `@` on the initial state
    fn state_input(&self) -> String {
        TextFormat::state_input(self.automaton())
    }

    /// `label,<observable>,<controllable>` per event
    fn event_input(&self) -> String {
        TextFormat::event_input(self.automaton())
    }

    /// `from,event,to[:TAG,...]` per transition
    fn transition_input(&self) -> String {
        TextFormat::transition_input(self)
    }
}

impl AutomatonView for Automaton {
    fn automaton(&self) -> &Automaton {
        self
    }
}
