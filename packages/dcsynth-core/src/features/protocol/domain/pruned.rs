/*
 * Pruned U-Structure
 *
 * Result of applying a protocol: the accessible part of the U-Structure
 * after the protocol's communications replaced the moves they stand for.
 * Protocol members are listed as `COMMUNICATION-<roles>`.
 */

use super::protocol::Protocol;
use crate::features::automaton::{Automaton, AutomatonView, TransitionData};
use crate::features::composition::UStructure;
use serde::Serialize;

pub const COMMUNICATION_TAG: &str = "COMMUNICATION";

#[derive(Debug, Clone, Serialize)]
pub struct PrunedUStructure {
    ustructure: UStructure,
    protocol: Protocol,
}

impl PrunedUStructure {
    pub(crate) fn new(ustructure: UStructure, protocol: Protocol) -> Self {
        Self {
            ustructure,
            protocol,
        }
    }

    pub fn ustructure(&self) -> &UStructure {
        &self.ustructure
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    pub fn unconditional_violations(&self) -> &[TransitionData] {
        self.ustructure.unconditional_violations()
    }

    pub fn conditional_violations(&self) -> &[TransitionData] {
        self.ustructure.conditional_violations()
    }

    /// No unconditional violation is left reachable
    pub fn is_safe(&self) -> bool {
        !self.ustructure.has_violations()
    }

    pub fn into_ustructure(self) -> UStructure {
        self.ustructure
    }
}

impl AutomatonView for PrunedUStructure {
    fn automaton(&self) -> &Automaton {
        self.ustructure.automaton()
    }

    fn transition_tags(&self, data: &TransitionData) -> Vec<String> {
        match self.protocol.iter().find(|c| &c.transition == data) {
            Some(member) => vec![format!("{}-{}", COMMUNICATION_TAG, member.roles_string())],
            None => self.ustructure.transition_tags(data),
        }
    }
}
