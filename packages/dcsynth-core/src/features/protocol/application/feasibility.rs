/*
 * Feasibility Checker
 *
 * A protocol is feasible when, after pruning:
 * 1. Every member's source is still reachable
 * 2. For every member c with sender s, each candidate with the same event
 *    and roles at a state s cannot tell apart from c's source (linked to it
 *    through moves s does not take part in, in either direction) is also
 *    a member
 *
 * A feasible protocol solves the control problem when no unconditional
 * violation remains reachable. Under the strict policy reachability is
 * measured with the non-member candidates left in place.
 *
 * The checker is built once per search and shared read-only by workers.
 */

use super::pruning::{event_vectors, prune_graph};
use crate::config::ReachabilityPolicy;
use crate::errors::Result;
use crate::features::automaton::{Automaton, AutomatonView, CommunicationData};
use crate::features::composition::UStructure;
use crate::features::label_vector::LabelVector;
use crate::shared::models::{EventId, StateId};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

pub struct FeasibilityChecker<'a> {
    ustructure: &'a UStructure,
    policy: ReachabilityPolicy,
    vectors: FxHashMap<EventId, LabelVector>,
    /// All candidates grouped by source state
    candidates_at: FxHashMap<StateId, Vec<CommunicationData>>,
}

impl<'a> FeasibilityChecker<'a> {
    pub fn new(ustructure: &'a UStructure, policy: ReachabilityPolicy) -> Self {
        let mut candidates_at: FxHashMap<StateId, Vec<CommunicationData>> = FxHashMap::default();
        for candidate in ustructure.candidates() {
            candidates_at
                .entry(candidate.transition.initial_state_id)
                .or_default()
                .push(candidate);
        }
        Self {
            ustructure,
            policy,
            vectors: event_vectors(ustructure.automaton()),
            candidates_at,
        }
    }

    pub fn policy(&self) -> ReachabilityPolicy {
        self.policy
    }

    pub fn is_feasible(&self, protocol: &[CommunicationData]) -> Result<bool> {
        let graph = prune_graph(self.ustructure, protocol, &self.vectors, true)?;
        Ok(self.consistent(&graph, protocol))
    }

    /// Feasible and free of reachable unconditional violations
    pub fn solves_control_problem(&self, protocol: &[CommunicationData]) -> Result<bool> {
        let graph = prune_graph(self.ustructure, protocol, &self.vectors, true)?;
        if !self.consistent(&graph, protocol) {
            return Ok(false);
        }

        let violated = match self.policy {
            ReachabilityPolicy::ReachableOnly => self.violation_reachable(&graph),
            ReachabilityPolicy::Strict => {
                let kept = prune_graph(self.ustructure, protocol, &self.vectors, false)?;
                self.violation_reachable(&kept)
            }
        };
        Ok(!violated)
    }

    fn violation_reachable(&self, graph: &Automaton) -> bool {
        let reachable = graph.accessible_state_ids();
        self.ustructure
            .unconditional_violations()
            .iter()
            .any(|d| reachable.contains(&d.initial_state_id) && graph.has_transition(d))
    }

    fn consistent(&self, graph: &Automaton, protocol: &[CommunicationData]) -> bool {
        let reachable = graph.accessible_state_ids();
        if protocol
            .iter()
            .any(|c| !reachable.contains(&c.transition.initial_state_id))
        {
            return false;
        }

        let members: FxHashSet<&CommunicationData> = protocol.iter().collect();
        // sender index -> undirected adjacency over its silent moves
        let mut silent_links: FxHashMap<usize, FxHashMap<StateId, Vec<StateId>>> =
            FxHashMap::default();

        for communication in protocol {
            let Some(sender) = communication.sender() else {
                continue;
            };
            // Component 0 is the plant
            let index = sender + 1;
            let links = silent_links
                .entry(index)
                .or_insert_with(|| self.silent_adjacency(graph, index));

            let start = communication.transition.initial_state_id;
            let mut visited: FxHashSet<StateId> = FxHashSet::default();
            let mut queue = VecDeque::from([start]);
            visited.insert(start);

            while let Some(current) = queue.pop_front() {
                let missing = self
                    .candidates_at
                    .get(&current)
                    .into_iter()
                    .flatten()
                    .any(|other| {
                        other.transition.event_id == communication.transition.event_id
                            && other.roles == communication.roles
                            && !members.contains(other)
                    });
                if missing {
                    return false;
                }

                for &next in links.get(&current).into_iter().flatten() {
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        true
    }

    fn silent_adjacency(&self, graph: &Automaton, index: usize) -> FxHashMap<StateId, Vec<StateId>> {
        let mut links: FxHashMap<StateId, Vec<StateId>> = FxHashMap::default();
        for t in graph.transitions() {
            let silent = self
                .vectors
                .get(&t.event_id)
                .map_or(false, |v| v.is_wildcard(index));
            if silent {
                links.entry(t.initial_state_id).or_default().push(t.target_state_id);
                links.entry(t.target_state_id).or_default().push(t.initial_state_id);
            }
        }
        links
    }
}
