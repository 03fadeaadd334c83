/*
 * Automaton Graph Store
 *
 * Finite automata for decentralized control with N controllers:
 * - States with marking and per-event control annotations
 * - Events with per-controller observability/controllability
 * - Transitions keyed by (state, event, state), optionally BAD
 *
 * Architecture:
 * - Domain: Automaton, State, Event, TransitionData and catalog records
 * - Application: accessible / coaccessible / trim / complement,
 *   intersection and union
 * - Infrastructure: text mini-language (state/event/transition input)
 * - Ports: AutomatonView (read-only access + tagged transition listing)
 */

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

// Re-export main types
pub use domain::{
    Automaton, CommunicationData, DisablementData, Event, EventAdded, NashCommunicationData, State,
    Transition, TransitionData, TransitionRecord,
};

pub use application::{intersection, union, DUMP_STATE_LABEL};

pub use infrastructure::TextFormat;

pub use ports::AutomatonView;
