//! Custom assertions and lookups for U-Structure tests

use dcsynth_core::{AutomatonView, CommunicationData, Protocol, TransitionData, UStructure};

/// `(source label, event label, target label)` of a transition
pub fn labels(u: &UStructure, data: &TransitionData) -> (String, String, String) {
    let automaton = u.automaton();
    (
        automaton.state(data.initial_state_id).unwrap().label.clone(),
        automaton.event(data.event_id).unwrap().label.clone(),
        automaton.state(data.target_state_id).unwrap().label.clone(),
    )
}

/// Candidate communication at `source` with vector `event`
pub fn communication(u: &UStructure, source: &str, event: &str) -> CommunicationData {
    u.candidates()
        .into_iter()
        .find(|c| {
            let (from, label, _) = labels(u, &c.transition);
            from == source && label == event
        })
        .unwrap_or_else(|| panic!("no communication {} at {}", event, source))
}

/// Protocol members as `(source, event)` label pairs
pub fn protocol_labels(u: &UStructure, protocol: &Protocol) -> Vec<(String, String)> {
    protocol
        .iter()
        .map(|c| {
            let (from, event, _) = labels(u, &c.transition);
            (from, event)
        })
        .collect()
}

pub fn assert_protocol(u: &UStructure, protocol: &Protocol, expected: &[(&str, &str)]) {
    let actual = protocol_labels(u, protocol);
    let expected: Vec<(String, String)> = expected
        .iter()
        .map(|(s, e)| (s.to_string(), e.to_string()))
        .collect();
    pretty_assertions::assert_eq!(actual, expected);
}
