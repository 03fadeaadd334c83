/*
 * Synchronized Composition Engine
 *
 * Input: plant automaton with N controllers.
 * Output: UStructure over tuples (plant, estimate_1, ..., estimate_N).
 *
 * Per explored tuple and per plant event e (ID order):
 * 1. Plant move: the plant takes e and every controller observing e takes
 *    e on its estimate (a branch dies if an observer cannot). Label: e at
 *    index 0 and at the observers, `*` elsewhere.
 * 2. Unobservable moves: every controller i not observing e that has e
 *    enabled at its estimate moves alone. Label: e at index i only.
 *
 * Plant moves are classified against C(e), the controllers controlling e.
 * Controller i judges e illegal when its estimate has no e transition or
 * only BAD ones.
 * - BAD, nobody in C(e) judges illegal  -> unconditional violation
 * - BAD, someone judges illegal         -> disablement decision; the move is
 *                                          not added and its target is not
 *                                          explored
 * - legal, C(e) non-empty, all of C(e)
 *   judge illegal                       -> conditional violation
 *
 * Only moves every observer can follow are classified.
 *
 * Each explored tuple also records, per controllable plant event enabled
 * at its plant component, an enablement (legal) or disablement (BAD)
 * annotation keyed by the system vector event.
 */

use crate::errors::{Result, SynthesisError};
use crate::features::automaton::{Automaton, AutomatonView, DisablementData, Event, TransitionData};
use crate::features::composition::domain::UStructure;
use crate::features::label_vector::{LabelVector, WILDCARD};
use crate::shared::models::{EventId, StateId, NO_STATE};
use crate::shared::ports::{NoopObserver, ProgressObserver};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, info};

/// Builder for the U-Structure of a plant
pub struct SynchronizedComposition<'a> {
    plant: &'a Automaton,
    observer: &'a dyn ProgressObserver,
}

/// Mutable exploration state
struct Exploration {
    automaton: Automaton,
    tuples: BTreeMap<StateId, Vec<StateId>>,
    index: FxHashMap<Vec<StateId>, StateId>,
    frontier: VecDeque<Vec<StateId>>,
}

impl Exploration {
    fn intern(&mut self, plant: &Automaton, tuple: Vec<StateId>, is_initial: bool) -> Result<StateId> {
        if let Some(&id) = self.index.get(&tuple) {
            return Ok(id);
        }

        let mut labels = Vec::with_capacity(tuple.len());
        for &component in &tuple {
            let state = plant
                .state(component)
                .ok_or(SynthesisError::UnknownState(component))?;
            labels.push(state.label.as_str());
        }
        let marked = plant.state(tuple[0]).map_or(false, |s| s.marked);

        let id = self
            .automaton
            .add_state(labels.join("_"), marked, is_initial)
            .map_err(|e| SynthesisError::operation_failed(format!("cannot add U-state: {}", e)))?;
        self.index.insert(tuple.clone(), id);
        self.tuples.insert(id, tuple.clone());
        self.frontier.push_back(tuple);
        Ok(id)
    }
}

/// Catalog entries collected while exploring
#[derive(Default)]
struct Classification {
    unconditional: Vec<TransitionData>,
    conditional: Vec<TransitionData>,
    disablements: Vec<DisablementData>,
    disabled_moves: FxHashSet<(StateId, EventId)>,
}

impl<'a> SynchronizedComposition<'a> {
    pub fn new(plant: &'a Automaton) -> Self {
        Self {
            plant,
            observer: &NoopObserver,
        }
    }

    /// Poll `observer` for cancellation once per explored tuple
    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn run(&self) -> Result<UStructure> {
        let plant = self.plant;
        let n = plant.n_controllers();
        let initial = plant.initial_state_id().ok_or_else(|| {
            SynthesisError::NoInitialState("synchronized composition needs an initial state".into())
        })?;

        let mut automaton = Automaton::new(n);
        let (system_events, guess_events) = register_events(plant, &mut automaton)?;

        let mut exploration = Exploration {
            automaton,
            tuples: BTreeMap::new(),
            index: FxHashMap::default(),
            frontier: VecDeque::new(),
        };
        exploration.intern(plant, vec![initial; n + 1], true)?;

        let mut classification = Classification::default();
        let mut explored = 0u64;

        while let Some(tuple) = exploration.frontier.pop_front() {
            if self.observer.is_cancelled() {
                return Err(SynthesisError::Cancelled);
            }
            let source = exploration.index[&tuple];

            for event in plant.events() {
                let system_event = system_events[&event.id];
                self.annotate(&mut exploration.automaton, source, tuple[0], event, system_event)?;
                self.plant_moves(
                    &mut exploration,
                    &mut classification,
                    &tuple,
                    source,
                    event,
                    system_event,
                )?;

                for i in (0..n).filter(|&i| !event.is_observable_by(i)) {
                    let guess = guess_events[&(event.id, i)];
                    for target in plant.targets(tuple[i + 1], event.id) {
                        let mut next = tuple.clone();
                        next[i + 1] = target;
                        let target_id = exploration.intern(plant, next, false)?;
                        exploration
                            .automaton
                            .add_transition(source, guess, target_id)?;
                    }
                }
            }

            explored += 1;
            self.observer
                .on_progress(explored, explored + exploration.frontier.len() as u64);
            if explored % 10_000 == 0 {
                debug!(explored, frontier = exploration.frontier.len(), "composition progress");
            }
        }

        let Exploration {
            automaton, tuples, ..
        } = exploration;
        let system_map: BTreeMap<EventId, EventId> = system_events.into_iter().collect();
        let mut ustructure = UStructure::new(automaton, plant.clone(), tuples, system_map);
        for data in classification.unconditional {
            ustructure.add_unconditional_violation(data);
        }
        for data in classification.conditional {
            ustructure.add_conditional_violation(data);
        }
        for data in classification.disablements {
            ustructure.add_disablement_decision(data);
        }

        info!(
            states = ustructure.automaton().n_states(),
            transitions = ustructure.automaton().n_transitions(),
            unconditional = ustructure.unconditional_violations().len(),
            conditional = ustructure.conditional_violations().len(),
            disablements = ustructure.disablement_decisions().len(),
            "U-Structure built"
        );
        Ok(ustructure)
    }

    /// Enablement / disablement annotation for a controllable event
    fn annotate(
        &self,
        automaton: &mut Automaton,
        source: StateId,
        plant_state: StateId,
        event: &Event,
        system_event: EventId,
    ) -> Result<()> {
        if !event.is_controllable() {
            return Ok(());
        }
        let targets = self.plant.targets(plant_state, event.id);
        if targets.is_empty() {
            return Ok(());
        }
        let bad = targets
            .iter()
            .any(|&t| self.plant.is_bad(&TransitionData::new(plant_state, event.id, t)));

        let state = automaton
            .state_mut(source)
            .ok_or(SynthesisError::UnknownState(source))?;
        if bad {
            state.mark_disablement(system_event)
        } else {
            state.mark_enablement(system_event)
        }
    }

    /// Controller `i` judges `event` illegal at its estimate
    fn judges_illegal(&self, estimate: StateId, event: EventId) -> bool {
        let targets = self.plant.targets(estimate, event);
        targets
            .iter()
            .all(|&t| self.plant.is_bad(&TransitionData::new(estimate, event, t)))
    }

    fn plant_moves(
        &self,
        exploration: &mut Exploration,
        classification: &mut Classification,
        tuple: &[StateId],
        source: StateId,
        event: &Event,
        system_event: EventId,
    ) -> Result<()> {
        let plant = self.plant;
        let n = plant.n_controllers();

        // Verdicts of the controllers in C(e); None for the others
        let verdicts: Vec<Option<bool>> = (0..n)
            .map(|i| {
                event
                    .is_controllable_by(i)
                    .then(|| self.judges_illegal(tuple[i + 1], event.id))
            })
            .collect();
        let any_disables = verdicts.iter().any(|v| *v == Some(true));
        let all_disable =
            verdicts.iter().any(Option::is_some) && verdicts.iter().flatten().all(|v| *v);

        for plant_target in plant.targets(tuple[0], event.id) {
            let successors = branches(plant, tuple, plant_target, event);
            if successors.is_empty() {
                // An observer cannot follow: the move does not exist
                continue;
            }
            let bad = plant.is_bad(&TransitionData::new(tuple[0], event.id, plant_target));

            if bad && any_disables {
                if classification.disabled_moves.insert((source, system_event)) {
                    let flags = verdicts.iter().map(|v| *v == Some(true)).collect();
                    classification.disablements.push(DisablementData::new(
                        TransitionData::new(source, system_event, NO_STATE),
                        flags,
                    ));
                }
                continue;
            }

            for next in successors {
                let target = exploration.intern(plant, next, false)?;
                exploration
                    .automaton
                    .add_transition(source, system_event, target)?;

                let data = TransitionData::new(source, system_event, target);
                if bad {
                    classification.unconditional.push(data);
                } else if all_disable {
                    classification.conditional.push(data);
                }
            }
        }
        Ok(())
    }
}

/// Successor tuples of a plant move: the plant goes to `plant_target`,
/// observers advance on every target of their estimate.
fn branches(
    plant: &Automaton,
    tuple: &[StateId],
    plant_target: StateId,
    event: &Event,
) -> Vec<Vec<StateId>> {
    let mut first = tuple.to_vec();
    first[0] = plant_target;
    let mut branches = vec![first];

    for i in 0..plant.n_controllers() {
        if !event.is_observable_by(i) {
            continue;
        }
        let targets = plant.targets(tuple[i + 1], event.id);
        branches = branches
            .into_iter()
            .flat_map(|b| {
                targets.iter().map(move |&t| {
                    let mut next = b.clone();
                    next[i + 1] = t;
                    next
                })
            })
            .collect();
        if branches.is_empty() {
            break;
        }
    }
    branches
}

type EventMaps = (
    FxHashMap<EventId, EventId>,
    FxHashMap<(EventId, usize), EventId>,
);

/// System vectors for every plant event, then one unobservable vector per
/// (controller, unobserved event).
fn register_events(plant: &Automaton, automaton: &mut Automaton) -> Result<EventMaps> {
    let n = plant.n_controllers();
    let mut system_events = FxHashMap::default();
    let mut guess_events = FxHashMap::default();

    for event in plant.events() {
        let components = std::iter::once(event.label.as_str()).chain((0..n).map(|i| {
            if event.is_observable_by(i) {
                event.label.as_str()
            } else {
                WILDCARD
            }
        }));
        let label = LabelVector::from_components(components)?.to_string();
        let id = automaton
            .add_event(label, &event.observable, &event.controllable)?
            .id();
        system_events.insert(event.id, id);
    }

    let silent = vec![false; n];
    for i in 0..n {
        for event in plant.events().filter(|e| !e.is_observable_by(i)) {
            let label = LabelVector::wildcard(n + 1)
                .with_component(i + 1, event.label.clone())?
                .to_string();
            let id = automaton.add_event(label, &silent, &silent)?.id();
            guess_events.insert((event.id, i), id);
        }
    }

    Ok((system_events, guess_events))
}

impl Automaton {
    /// Build the U-Structure of this plant
    pub fn synchronized_composition(&self) -> Result<UStructure> {
        SynchronizedComposition::new(self).run()
    }
}
