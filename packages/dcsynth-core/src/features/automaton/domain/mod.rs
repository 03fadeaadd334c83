/*
 * Automaton Domain Models
 *
 * Core graph store types: states, events, transitions and catalog records.
 */

mod automaton;
mod event;
mod state;
mod transition;

pub use automaton::Automaton;
pub use event::{Event, EventAdded};
pub use state::State;
pub use transition::{
    CommunicationData, DisablementData, NashCommunicationData, Transition, TransitionData,
    TransitionRecord,
};
