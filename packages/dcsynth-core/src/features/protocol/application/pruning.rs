use crate::errors::{Result, SynthesisError};
use crate::features::automaton::{Automaton, AutomatonView, CommunicationData, TransitionData};
use crate::features::composition::UStructure;
use crate::features::label_vector::LabelVector;
use crate::features::protocol::domain::{Protocol, PrunedUStructure};
use crate::shared::models::EventId;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Parsed label vector of every event; labels that are not vectors are skipped
pub(crate) fn event_vectors(automaton: &Automaton) -> FxHashMap<EventId, LabelVector> {
    automaton
        .events()
        .filter_map(|e| LabelVector::try_parse(&e.label).map(|v| (e.id, v)))
        .collect()
}

/// Unreachable-part-included graph after applying `protocol`:
/// candidates outside the protocol are removed (only when `discard_unused`),
/// then at each member's source every other move whose vector agrees with
/// the member's vector.
pub(crate) fn prune_graph(
    ustructure: &UStructure,
    protocol: &[CommunicationData],
    vectors: &FxHashMap<EventId, LabelVector>,
    discard_unused: bool,
) -> Result<Automaton> {
    if let Some(stranger) = protocol.iter().find(|c| !ustructure.is_candidate(c)) {
        return Err(SynthesisError::operation_failed(format!(
            "{} is not a candidate communication",
            stranger.transition
        )));
    }

    let members: FxHashSet<TransitionData> = protocol.iter().map(|c| c.transition).collect();
    let mut graph = ustructure.automaton().clone();

    if discard_unused {
        for candidate in ustructure.candidates() {
            if !members.contains(&candidate.transition) {
                graph.remove_transition(&candidate.transition);
            }
        }
    }

    for communication in protocol {
        let source = communication.transition.initial_state_id;
        let Some(vector) = vectors.get(&communication.transition.event_id) else {
            continue;
        };
        let Some(state) = graph.state(source) else {
            continue;
        };

        let replaced: Vec<TransitionData> = state
            .transitions()
            .iter()
            .map(|t| TransitionData::new(source, t.event_id, t.target_state_id))
            .filter(|d| !members.contains(d))
            .filter(|d| {
                vectors
                    .get(&d.event_id)
                    .is_some_and(|other| vector.agrees_with(other))
            })
            .collect();

        for data in &replaced {
            graph.remove_transition(data);
        }
    }

    Ok(graph)
}

impl UStructure {
    /// Accessible part of this structure once `protocol` is in force
    pub fn apply_protocol(&self, protocol: &Protocol) -> Result<PrunedUStructure> {
        let vectors = event_vectors(self.automaton());
        let graph = prune_graph(self, protocol.communications(), &vectors, true)?.accessible();
        debug!(
            members = protocol.len(),
            states = graph.n_states(),
            transitions = graph.n_transitions(),
            "protocol applied"
        );
        Ok(PrunedUStructure::new(self.restricted(graph), protocol.clone()))
    }
}
