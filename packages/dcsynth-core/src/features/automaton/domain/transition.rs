/*
 * Transitions and Catalog Records
 *
 * A transition is stored on its source state as (event, target). The full
 * triple is `TransitionData`; catalog records extend it:
 *   DisablementData         + per-controller disable flags
 *   CommunicationData       + per-controller roles
 *   NashCommunicationData   + cost and probability
 */

use crate::errors::{Result, SynthesisError};
use crate::features::label_vector::{format_roles, CommunicationRole};
use crate::shared::models::{EventId, StateId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outgoing edge stored on a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transition {
    pub event_id: EventId,
    pub target_state_id: StateId,
}

impl Transition {
    pub fn new(event_id: EventId, target_state_id: StateId) -> Self {
        Self {
            event_id,
            target_state_id,
        }
    }
}

/// `(source, event, target)` triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionData {
    pub initial_state_id: StateId,
    pub event_id: EventId,
    pub target_state_id: StateId,
}

impl TransitionData {
    pub fn new(initial_state_id: StateId, event_id: EventId, target_state_id: StateId) -> Self {
        Self {
            initial_state_id,
            event_id,
            target_state_id,
        }
    }

    pub fn edge(&self) -> Transition {
        Transition::new(self.event_id, self.target_state_id)
    }
}

impl fmt::Display for TransitionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{},{})",
            self.initial_state_id, self.event_id, self.target_state_id
        )
    }
}

/// A BAD plant move that some controllers disable
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisablementData {
    pub transition: TransitionData,
    /// `controllers[i]`: controller i disables the event here
    pub controllers: Vec<bool>,
}

impl DisablementData {
    pub fn new(transition: TransitionData, controllers: Vec<bool>) -> Self {
        Self {
            transition,
            controllers,
        }
    }

    /// `T`/`F` flag string, as used in `DISABLEMENT_DECISION-<flags>`
    pub fn flags(&self) -> String {
        self.controllers
            .iter()
            .map(|c| if *c { 'T' } else { 'F' })
            .collect()
    }
}

/// Communication between controllers
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommunicationData {
    pub transition: TransitionData,
    pub roles: Vec<CommunicationRole>,
}

impl CommunicationData {
    pub fn new(transition: TransitionData, roles: Vec<CommunicationRole>) -> Self {
        Self { transition, roles }
    }

    /// Controller index (0-based) of the sender
    pub fn sender(&self) -> Option<usize> {
        self.roles.iter().position(|r| *r == CommunicationRole::Sender)
    }

    pub fn receivers(&self) -> impl Iterator<Item = usize> + '_ {
        self.roles
            .iter()
            .enumerate()
            .filter(|(_, r)| **r == CommunicationRole::Receiver)
            .map(|(i, _)| i)
    }

    pub fn roles_string(&self) -> String {
        format_roles(&self.roles)
    }
}

/// Communication with a cost model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NashCommunicationData {
    pub communication: CommunicationData,
    pub cost: f64,
    pub probability: f64,
}

impl NashCommunicationData {
    /// Validates `cost >= 0` and `0 <= probability <= 1`
    pub fn new(communication: CommunicationData, cost: f64, probability: f64) -> Result<Self> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(SynthesisError::operation_failed(format!(
                "communication cost must be a finite value >= 0, got {}",
                cost
            )));
        }
        if !(0.0..=1.0).contains(&probability) {
            return Err(SynthesisError::operation_failed(format!(
                "communication probability must be in [0, 1], got {}",
                probability
            )));
        }
        Ok(Self {
            communication,
            cost,
            probability,
        })
    }

    pub fn expected_cost(&self) -> f64 {
        self.cost * self.probability
    }
}

/// Catalogued transition with its kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransitionRecord {
    Plain(TransitionData),
    Disablement(DisablementData),
    Communication(CommunicationData),
    Nash(NashCommunicationData),
}

impl TransitionRecord {
    pub fn data(&self) -> &TransitionData {
        match self {
            Self::Plain(data) => data,
            Self::Disablement(d) => &d.transition,
            Self::Communication(c) => &c.transition,
            Self::Nash(n) => &n.communication.transition,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Plain(_) => "plain",
            Self::Disablement(_) => "disablement",
            Self::Communication(_) => "communication",
            Self::Nash(_) => "nash",
        }
    }

    /// The communication part of communication and Nash records
    pub fn communication(&self) -> Option<&CommunicationData> {
        match self {
            Self::Communication(c) => Some(c),
            Self::Nash(n) => Some(&n.communication),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::label_vector::parse_roles;

    #[test]
    fn test_nash_ranges() {
        let comm = CommunicationData::new(TransitionData::new(1, 2, 3), parse_roles("SR").unwrap());
        assert!(NashCommunicationData::new(comm.clone(), 2.0, 0.5).is_ok());
        assert!(NashCommunicationData::new(comm.clone(), -1.0, 0.5).is_err());
        assert!(NashCommunicationData::new(comm.clone(), 1.0, 1.5).is_err());
        assert!(NashCommunicationData::new(comm.clone(), f64::NAN, 0.5).is_err());

        let nash = NashCommunicationData::new(comm, 4.0, 0.25).unwrap();
        assert!((nash.expected_cost() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_roles_accessors() {
        let comm = CommunicationData::new(TransitionData::new(1, 2, 3), parse_roles("RS*R").unwrap());
        assert_eq!(comm.sender(), Some(1));
        assert_eq!(comm.receivers().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(comm.roles_string(), "RS*R");
    }

    #[test]
    fn test_record_kinds() {
        let data = TransitionData::new(1, 2, 3);
        let disable = DisablementData::new(data, vec![true, false]);
        assert_eq!(disable.flags(), "TF");

        let record = TransitionRecord::Disablement(disable);
        assert_eq!(record.data(), &data);
        assert_eq!(record.kind_name(), "disablement");
        assert!(record.communication().is_none());
    }
}
