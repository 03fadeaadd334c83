/*
 * U-Structure
 *
 * Automaton produced by synchronized composition plus the catalogs the
 * later stages work on:
 *   unconditional violations   BAD moves no controller can stop
 *   conditional violations     legal moves every controller would stop
 *   disablement decisions      BAD moves some controller stops (not in graph)
 *   potential communications   candidate protocol members
 *   invalid communications     communications with no target state
 *   Nash communications        potential communications with a cost model
 *
 * A triple appears in at most one of the potential / Nash catalogs.
 * `tuples` maps every U-state to its (plant, estimate_1..N) components,
 * expressed in plant state IDs.
 */

use crate::errors::{Result, SynthesisError};
use crate::features::automaton::{
    Automaton, AutomatonView, CommunicationData, DisablementData, NashCommunicationData,
    TextFormat, TransitionData, TransitionRecord,
};
use crate::shared::models::{EventId, Sequence, StateId};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

pub const UNCONDITIONAL_VIOLATION_TAG: &str = "UNCONDITIONAL_VIOLATION";
pub const CONDITIONAL_VIOLATION_TAG: &str = "CONDITIONAL_VIOLATION";
pub const DISABLEMENT_DECISION_TAG: &str = "DISABLEMENT_DECISION";
pub const POTENTIAL_COMMUNICATION_TAG: &str = "POTENTIAL_COMMUNICATION";
pub const INVALID_COMMUNICATION_TAG: &str = "INVALID_COMMUNICATION";
pub const NASH_COMMUNICATION_TAG: &str = "NASH_COMMUNICATION";

/// Catalog a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CatalogKind {
    UnconditionalViolation,
    ConditionalViolation,
    DisablementDecision,
    PotentialCommunication,
    InvalidCommunication,
    NashCommunication,
}

#[derive(Debug, Clone, Serialize)]
pub struct UStructure {
    automaton: Automaton,
    plant: Automaton,
    tuples: BTreeMap<StateId, Vec<StateId>>,
    #[serde(skip)]
    tuple_index: FxHashMap<Vec<StateId>, StateId>,
    /// plant event -> system vector event
    system_events: BTreeMap<EventId, EventId>,
    unconditional_violations: Vec<TransitionData>,
    conditional_violations: Vec<TransitionData>,
    disablement_decisions: Vec<DisablementData>,
    potential_communications: Vec<CommunicationData>,
    invalid_communications: Vec<CommunicationData>,
    nash_communications: Vec<NashCommunicationData>,
}

impl UStructure {
    pub(crate) fn new(
        automaton: Automaton,
        plant: Automaton,
        tuples: BTreeMap<StateId, Vec<StateId>>,
        system_events: BTreeMap<EventId, EventId>,
    ) -> Self {
        let tuple_index = tuples.iter().map(|(id, t)| (t.clone(), *id)).collect();
        Self {
            automaton,
            plant,
            tuples,
            tuple_index,
            system_events,
            unconditional_violations: Vec::new(),
            conditional_violations: Vec::new(),
            disablement_decisions: Vec::new(),
            potential_communications: Vec::new(),
            invalid_communications: Vec::new(),
            nash_communications: Vec::new(),
        }
    }

    pub fn n_controllers(&self) -> usize {
        self.automaton.n_controllers()
    }

    /// Automaton the structure was composed from
    pub fn plant(&self) -> &Automaton {
        &self.plant
    }

    pub(crate) fn automaton_mut(&mut self) -> &mut Automaton {
        &mut self.automaton
    }

    /// (plant, estimate_1, ..., estimate_N) of a U-state
    pub fn tuple(&self, state: StateId) -> Option<&[StateId]> {
        self.tuples.get(&state).map(Vec::as_slice)
    }

    pub fn state_for_tuple(&self, tuple: &[StateId]) -> Option<StateId> {
        self.tuple_index.get(tuple).copied()
    }

    /// Vector event carrying the plant move of `plant_event`
    pub fn system_event(&self, plant_event: EventId) -> Option<EventId> {
        self.system_events.get(&plant_event).copied()
    }

    pub fn system_events(&self) -> impl Iterator<Item = (EventId, EventId)> + '_ {
        self.system_events.iter().map(|(p, s)| (*p, *s))
    }

    // ========================================================================
    // Catalogs
    // ========================================================================

    pub fn unconditional_violations(&self) -> &[TransitionData] {
        &self.unconditional_violations
    }

    pub fn conditional_violations(&self) -> &[TransitionData] {
        &self.conditional_violations
    }

    pub fn disablement_decisions(&self) -> &[DisablementData] {
        &self.disablement_decisions
    }

    pub fn potential_communications(&self) -> &[CommunicationData] {
        &self.potential_communications
    }

    pub fn invalid_communications(&self) -> &[CommunicationData] {
        &self.invalid_communications
    }

    pub fn nash_communications(&self) -> &[NashCommunicationData] {
        &self.nash_communications
    }

    pub fn has_violations(&self) -> bool {
        !self.unconditional_violations.is_empty()
    }

    /// Protocol candidates: potential then Nash communications
    pub fn candidates(&self) -> Vec<CommunicationData> {
        self.potential_communications
            .iter()
            .cloned()
            .chain(self.nash_communications.iter().map(|n| n.communication.clone()))
            .collect()
    }

    pub fn is_candidate(&self, communication: &CommunicationData) -> bool {
        self.potential_communications.contains(communication)
            || self
                .nash_communications
                .iter()
                .any(|n| &n.communication == communication)
    }

    /// Every catalogued transition with its catalog
    pub fn records(&self) -> Vec<(CatalogKind, TransitionRecord)> {
        let mut records = Vec::new();
        records.extend(
            self.unconditional_violations
                .iter()
                .map(|d| (CatalogKind::UnconditionalViolation, TransitionRecord::Plain(*d))),
        );
        records.extend(
            self.conditional_violations
                .iter()
                .map(|d| (CatalogKind::ConditionalViolation, TransitionRecord::Plain(*d))),
        );
        records.extend(self.disablement_decisions.iter().map(|d| {
            (
                CatalogKind::DisablementDecision,
                TransitionRecord::Disablement(d.clone()),
            )
        }));
        records.extend(self.potential_communications.iter().map(|c| {
            (
                CatalogKind::PotentialCommunication,
                TransitionRecord::Communication(c.clone()),
            )
        }));
        records.extend(self.invalid_communications.iter().map(|c| {
            (
                CatalogKind::InvalidCommunication,
                TransitionRecord::Communication(c.clone()),
            )
        }));
        records.extend(
            self.nash_communications
                .iter()
                .map(|n| (CatalogKind::NashCommunication, TransitionRecord::Nash(n.clone()))),
        );
        records
    }

    pub(crate) fn add_unconditional_violation(&mut self, data: TransitionData) {
        if !self.unconditional_violations.contains(&data) {
            self.unconditional_violations.push(data);
        }
    }

    pub(crate) fn add_conditional_violation(&mut self, data: TransitionData) {
        if !self.conditional_violations.contains(&data) {
            self.conditional_violations.push(data);
        }
    }

    pub(crate) fn add_disablement_decision(&mut self, data: DisablementData) {
        if !self.disablement_decisions.contains(&data) {
            self.disablement_decisions.push(data);
        }
    }

    pub(crate) fn add_potential_communication(&mut self, data: CommunicationData) {
        if !self.potential_communications.contains(&data) {
            self.potential_communications.push(data);
        }
    }

    pub(crate) fn add_invalid_communication(&mut self, data: CommunicationData) {
        if !self.invalid_communications.contains(&data) {
            self.invalid_communications.push(data);
        }
    }

    /// Attach a cost model to a potential communication, moving it into the
    /// Nash catalog. Updating an existing Nash communication replaces its
    /// cost and probability.
    pub fn set_nash_information(
        &mut self,
        communication: &CommunicationData,
        cost: f64,
        probability: f64,
    ) -> Result<()> {
        let nash = NashCommunicationData::new(communication.clone(), cost, probability)?;

        if let Some(existing) = self
            .nash_communications
            .iter_mut()
            .find(|n| &n.communication == communication)
        {
            *existing = nash;
            return Ok(());
        }

        let position = self
            .potential_communications
            .iter()
            .position(|c| c == communication)
            .ok_or_else(|| {
                SynthesisError::operation_failed(format!(
                    "{} is not a potential communication",
                    communication.transition
                ))
            })?;
        self.potential_communications.remove(position);
        self.nash_communications.push(nash);
        Ok(())
    }

    /// Copy over a sub-automaton: tuples and catalogs keep only entries
    /// whose transitions (or, for disabled moves, source states) survive.
    pub(crate) fn restricted(&self, automaton: Automaton) -> UStructure {
        let tuples: BTreeMap<StateId, Vec<StateId>> = self
            .tuples
            .iter()
            .filter(|(id, _)| automaton.state(**id).is_some())
            .map(|(id, t)| (*id, t.clone()))
            .collect();

        let mut result = UStructure::new(
            automaton,
            self.plant.clone(),
            tuples,
            self.system_events.clone(),
        );
        let present = |d: &TransitionData| result.automaton.has_transition(d);
        let has_state = |id: StateId| result.automaton.state(id).is_some();

        let unconditional = self
            .unconditional_violations
            .iter()
            .filter(|&d| present(d))
            .copied()
            .collect();
        let conditional = self
            .conditional_violations
            .iter()
            .filter(|&d| present(d))
            .copied()
            .collect();
        let disablements = self
            .disablement_decisions
            .iter()
            .filter(|d| has_state(d.transition.initial_state_id))
            .cloned()
            .collect();
        let potential = self
            .potential_communications
            .iter()
            .filter(|c| present(&c.transition))
            .cloned()
            .collect();
        let invalid = self
            .invalid_communications
            .iter()
            .filter(|c| has_state(c.transition.initial_state_id))
            .cloned()
            .collect();
        let nash = self
            .nash_communications
            .iter()
            .filter(|n| present(&n.communication.transition))
            .cloned()
            .collect();

        result.unconditional_violations = unconditional;
        result.conditional_violations = conditional;
        result.disablement_decisions = disablements;
        result.potential_communications = potential;
        result.invalid_communications = invalid;
        result.nash_communications = nash;
        result
    }

    // ========================================================================
    // Counterexamples
    // ========================================================================

    /// Shortest run from the initial state ending with `transition`
    pub fn witness(&self, transition: &TransitionData) -> Option<Sequence> {
        if !self.automaton.has_transition(transition) {
            return None;
        }
        let prefix = self.shortest_path_to(transition.initial_state_id)?;
        Some(prefix.extended(transition.event_id, transition.target_state_id))
    }

    fn shortest_path_to(&self, goal: StateId) -> Option<Sequence> {
        let initial = self.automaton.initial_state_id()?;
        let mut parents: FxHashMap<StateId, (StateId, EventId)> = FxHashMap::default();
        let mut seen = FxHashSet::default();
        let mut frontier = VecDeque::from([initial]);
        seen.insert(initial);

        while let Some(id) = frontier.pop_front() {
            if id == goal {
                let mut states = vec![id];
                let mut events = Vec::new();
                let mut cursor = id;
                while let Some(&(parent, event)) = parents.get(&cursor) {
                    states.push(parent);
                    events.push(event);
                    cursor = parent;
                }
                states.reverse();
                events.reverse();
                return Sequence::new(states, events).ok();
            }
            for t in self.automaton.state(id)?.transitions() {
                if seen.insert(t.target_state_id) {
                    parents.insert(t.target_state_id, (id, t.event_id));
                    frontier.push_back(t.target_state_id);
                }
            }
        }
        None
    }

    // ========================================================================
    // Text output
    // ========================================================================

    /// `state,event:DISABLEMENT_DECISION-<flags>` per disablement decision
    pub fn disablement_input(&self) -> String {
        self.disablement_decisions
            .iter()
            .filter_map(|d| {
                let (state, event) = self.labels_of(&d.transition)?;
                Some(format!(
                    "{},{}:{}-{}",
                    state,
                    event,
                    DISABLEMENT_DECISION_TAG,
                    d.flags()
                ))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `state,event:INVALID_COMMUNICATION-<roles>` per invalid communication
    pub fn invalid_communication_input(&self) -> String {
        self.invalid_communications
            .iter()
            .filter_map(|c| {
                let (state, event) = self.labels_of(&c.transition)?;
                Some(format!(
                    "{},{}:{}-{}",
                    state,
                    event,
                    INVALID_COMMUNICATION_TAG,
                    c.roles_string()
                ))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn labels_of(&self, data: &TransitionData) -> Option<(&str, &str)> {
        let state = self.automaton.state(data.initial_state_id)?;
        let event = self.automaton.event(data.event_id)?;
        Some((state.label.as_str(), event.label.as_str()))
    }
}

impl AutomatonView for UStructure {
    fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    fn transition_tags(&self, data: &TransitionData) -> Vec<String> {
        let mut tags = Vec::new();
        if self.automaton.is_bad(data) {
            tags.push(TextFormat::BAD_TAG.to_string());
        }
        if self.unconditional_violations.contains(data) {
            tags.push(UNCONDITIONAL_VIOLATION_TAG.to_string());
        }
        if self.conditional_violations.contains(data) {
            tags.push(CONDITIONAL_VIOLATION_TAG.to_string());
        }
        if let Some(c) = self
            .potential_communications
            .iter()
            .find(|c| &c.transition == data)
        {
            tags.push(format!("{}-{}", POTENTIAL_COMMUNICATION_TAG, c.roles_string()));
        }
        if let Some(n) = self
            .nash_communications
            .iter()
            .find(|n| &n.communication.transition == data)
        {
            tags.push(format!(
                "{}-{}-{}-{}",
                NASH_COMMUNICATION_TAG,
                n.communication.roles_string(),
                n.cost,
                n.probability
            ));
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::label_vector::parse_roles;

    /// 1 -x-> 2 -y-> 3 with a communication catalogued on 2 -y-> 3
    fn small() -> UStructure {
        let mut automaton = Automaton::new(1);
        for label in ["1_1", "2_2", "3_3"] {
            automaton.add_state(label, false, label == "1_1").unwrap();
        }
        let x = automaton.add_event("<x,x>", &[true], &[false]).unwrap().id();
        let y = automaton.add_event("<y,y>", &[true], &[true]).unwrap().id();
        automaton.add_transition(1, x, 2).unwrap();
        automaton.add_transition(2, y, 3).unwrap();

        let tuples = [(1, vec![1, 1]), (2, vec![2, 2]), (3, vec![3, 3])]
            .into_iter()
            .collect();
        let mut u = UStructure::new(automaton, Automaton::new(1), tuples, BTreeMap::new());
        u.add_potential_communication(CommunicationData::new(
            TransitionData::new(2, 2, 3),
            parse_roles("S").unwrap(),
        ));
        u.add_unconditional_violation(TransitionData::new(1, 1, 2));
        u
    }

    #[test]
    fn test_tuple_lookup() {
        let u = small();
        assert_eq!(u.tuple(2), Some(&[2, 2][..]));
        assert_eq!(u.state_for_tuple(&[3, 3]), Some(3));
        assert_eq!(u.state_for_tuple(&[3, 1]), None);
    }

    #[test]
    fn test_witness_is_shortest_path() {
        let u = small();
        let w = u.witness(&TransitionData::new(2, 2, 3)).unwrap();
        assert_eq!(w.state_ids(), &[1, 2, 3]);
        assert_eq!(w.event_ids(), &[1, 2]);
        assert!(u.witness(&TransitionData::new(3, 2, 1)).is_none());
    }

    #[test]
    fn test_nash_moves_between_catalogs() {
        let mut u = small();
        let comm = u.potential_communications()[0].clone();

        u.set_nash_information(&comm, 3.0, 0.5).unwrap();
        assert!(u.potential_communications().is_empty());
        assert_eq!(u.nash_communications().len(), 1);
        assert!(u.is_candidate(&comm));

        // Update in place
        u.set_nash_information(&comm, 1.0, 1.0).unwrap();
        assert_eq!(u.nash_communications().len(), 1);
        assert_eq!(u.nash_communications()[0].cost, 1.0);

        assert!(u.set_nash_information(&comm, -1.0, 0.5).is_err());
        let unknown = CommunicationData::new(TransitionData::new(1, 1, 2), parse_roles("S").unwrap());
        assert!(u.set_nash_information(&unknown, 1.0, 0.5).is_err());
    }

    #[test]
    fn test_transition_tags() {
        let mut u = small();
        assert_eq!(
            u.transition_input(),
            "1_1,<x,x>,2_2:UNCONDITIONAL_VIOLATION\n2_2,<y,y>,3_3:POTENTIAL_COMMUNICATION-S"
        );

        let comm = u.potential_communications()[0].clone();
        u.set_nash_information(&comm, 2.0, 0.25).unwrap();
        assert!(u
            .transition_input()
            .ends_with("3_3:NASH_COMMUNICATION-S-2-0.25"));
    }

    #[test]
    fn test_records_and_restriction() {
        let u = small();
        let kinds: Vec<CatalogKind> = u.records().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![
                CatalogKind::UnconditionalViolation,
                CatalogKind::PotentialCommunication
            ]
        );

        let mut sub = u.automaton().clone();
        sub.remove_transition(&TransitionData::new(2, 2, 3));
        let restricted = u.restricted(sub);
        assert!(restricted.potential_communications().is_empty());
        assert_eq!(restricted.unconditional_violations().len(), 1);
    }
}
