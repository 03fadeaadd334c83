use crate::errors::{Result, SynthesisError};
use crate::features::automaton::{AutomatonView, CommunicationData, TransitionData};
use crate::features::composition::UStructure;
use crate::features::label_vector::{CommunicationRole, LabelVector, WILDCARD};
use crate::shared::models::{EventId, StateId, NO_STATE};
use tracing::{debug, info};

/// One communication shape for a plant event: which tuple components move
/// and which role each controller plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunicationPattern {
    pub plant_event: EventId,
    /// Vector event registered in the U-Structure
    pub event_id: EventId,
    pub vector: LabelVector,
    /// Tuple indices that advance (0 = plant)
    pub moving: Vec<usize>,
    pub roles: Vec<CommunicationRole>,
}

pub struct CommunicationClassifier<'a> {
    ustructure: &'a UStructure,
}

impl<'a> CommunicationClassifier<'a> {
    pub fn new(ustructure: &'a UStructure) -> Self {
        Self { ustructure }
    }

    /// New U-Structure with communication transitions and catalogs added
    pub fn classify(&self) -> Result<UStructure> {
        let mut result = self.ustructure.clone();
        let patterns = register_patterns(&mut result)?;
        debug!(patterns = patterns.len(), "communication patterns registered");

        let plant = self.ustructure.plant();
        let state_ids: Vec<StateId> = self.ustructure.automaton().state_ids().collect();

        for source in state_ids {
            let tuple = self
                .ustructure
                .tuple(source)
                .ok_or(SynthesisError::UnknownState(source))?;

            for pattern in &patterns {
                let mut combos = vec![tuple.to_vec()];
                for &k in &pattern.moving {
                    let targets = plant.targets(tuple[k], pattern.plant_event);
                    combos = combos
                        .into_iter()
                        .flat_map(|c| {
                            targets.iter().map(move |&t| {
                                let mut next = c.clone();
                                next[k] = t;
                                next
                            })
                        })
                        .collect();
                    if combos.is_empty() {
                        break;
                    }
                }

                for target_tuple in combos {
                    match self.ustructure.state_for_tuple(&target_tuple) {
                        Some(target) => {
                            result
                                .automaton_mut()
                                .add_transition(source, pattern.event_id, target)?;
                            result.add_potential_communication(CommunicationData::new(
                                TransitionData::new(source, pattern.event_id, target),
                                pattern.roles.clone(),
                            ));
                        }
                        None => result.add_invalid_communication(CommunicationData::new(
                            TransitionData::new(source, pattern.event_id, NO_STATE),
                            pattern.roles.clone(),
                        )),
                    }
                }
            }
        }

        info!(
            potential = result.potential_communications().len(),
            invalid = result.invalid_communications().len(),
            "communications classified"
        );
        Ok(result)
    }
}

/// For every plant event with both observers and non-observers, one
/// pattern per non-empty subset of the non-observers (subset masks in
/// ascending order). The sender is the lowest-indexed observer.
fn register_patterns(ustructure: &mut UStructure) -> Result<Vec<CommunicationPattern>> {
    let n = ustructure.n_controllers();
    let plant_events: Vec<_> = ustructure.plant().events().cloned().collect();
    let mut patterns = Vec::new();

    for event in &plant_events {
        let observers: Vec<usize> = (0..n).filter(|&i| event.is_observable_by(i)).collect();
        let hidden: Vec<usize> = (0..n).filter(|&i| !event.is_observable_by(i)).collect();
        let Some(&sender) = observers.first() else {
            continue;
        };
        if hidden.is_empty() || hidden.len() >= usize::BITS as usize {
            continue;
        }

        for mask in 1usize..(1 << hidden.len()) {
            let receivers: Vec<usize> = hidden
                .iter()
                .enumerate()
                .filter(|(j, _)| mask >> j & 1 == 1)
                .map(|(_, &i)| i)
                .collect();

            let mut components = vec![event.label.as_str(); n + 1];
            let mut roles = vec![CommunicationRole::None; n];
            let mut observable = vec![false; n];
            for i in 0..n {
                let informed = event.is_observable_by(i) || receivers.contains(&i);
                if !informed {
                    components[i + 1] = WILDCARD;
                }
                observable[i] = informed;
                if i == sender {
                    roles[i] = CommunicationRole::Sender;
                } else if receivers.contains(&i) {
                    roles[i] = CommunicationRole::Receiver;
                }
            }

            let vector = LabelVector::from_components(components)?;
            let event_id = ustructure
                .automaton_mut()
                .add_event(vector.to_string(), &observable, &event.controllable)?
                .id();

            let moving = std::iter::once(0)
                .chain(observers.iter().map(|i| i + 1))
                .chain(receivers.iter().map(|i| i + 1))
                .collect();

            patterns.push(CommunicationPattern {
                plant_event: event.id,
                event_id,
                vector,
                moving,
                roles,
            });
        }
    }
    Ok(patterns)
}

impl UStructure {
    /// Copy of this structure with potential / invalid communications added
    pub fn add_communications(&self) -> Result<UStructure> {
        CommunicationClassifier::new(self).classify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::automaton::{Automaton, TextFormat};
    use crate::features::label_vector::format_roles;

    /// Controller 1 sees `a`, controller 2 does not; controller 2 controls `b`
    fn plant() -> Automaton {
        TextFormat::parse(
            2,
            "@1,F\n2,F\n3,F",
            "a,TF,FF\nb,TT,FT",
            "1,a,2\n2,b,3",
        )
        .unwrap()
    }

    #[test]
    fn test_communication_vectors_and_roles() {
        let u = plant().synchronized_composition().unwrap();
        let with_comms = u.add_communications().unwrap();

        let comm = &with_comms.potential_communications()[0];
        let event = with_comms.automaton().event(comm.transition.event_id).unwrap();
        assert_eq!(event.label, "<a,a,a>");
        assert_eq!(event.observable, vec![true, true]);
        assert_eq!(format_roles(&comm.roles), "SR");

        let source = with_comms.automaton().state(comm.transition.initial_state_id).unwrap();
        let target = with_comms.automaton().state(comm.transition.target_state_id).unwrap();
        assert_eq!(source.label, "1_1_1");
        assert_eq!(target.label, "2_2_2");
    }

    #[test]
    fn test_existing_transitions_untouched() {
        let u = plant().synchronized_composition().unwrap();
        let with_comms = u.add_communications().unwrap();

        for data in u.automaton().transitions() {
            assert!(with_comms.automaton().has_transition(&data));
        }
        assert_eq!(
            with_comms.automaton().n_transitions(),
            u.automaton().n_transitions() + with_comms.potential_communications().len()
        );
        // The input structure is not modified
        assert!(u.potential_communications().is_empty());
    }

    #[test]
    fn test_targets_are_states_of_the_structure() {
        let with_comms = plant()
            .synchronized_composition()
            .unwrap()
            .add_communications()
            .unwrap();
        for comm in with_comms.potential_communications() {
            assert!(with_comms
                .tuple(comm.transition.target_state_id)
                .is_some());
        }
        for comm in with_comms.invalid_communications() {
            assert_eq!(comm.transition.target_state_id, NO_STATE);
        }
    }
}
