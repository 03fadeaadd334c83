/*
 * Communication Labels
 *
 * A communication is a vector label plus one role per controller:
 *   S = sends (observed the event)
 *   R = receives (learns about the event)
 *   * = not involved
 * Roles are written as a compact string, e.g. "SR" or "S*R".
 */

use super::label_vector::LabelVector;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of one controller in a communication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommunicationRole {
    Sender,
    Receiver,
    None,
}

impl CommunicationRole {
    pub fn symbol(self) -> char {
        match self {
            Self::Sender => 'S',
            Self::Receiver => 'R',
            Self::None => '*',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'S' => Some(Self::Sender),
            'R' => Some(Self::Receiver),
            '*' => Some(Self::None),
            _ => None,
        }
    }
}

/// Compact role string, one character per controller
pub fn format_roles(roles: &[CommunicationRole]) -> String {
    roles.iter().map(|r| r.symbol()).collect()
}

/// Inverse of [`format_roles`]
pub fn parse_roles(raw: &str) -> Option<Vec<CommunicationRole>> {
    raw.chars().map(CommunicationRole::from_symbol).collect()
}

/// Vector label with roles; equality covers both
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommunicationLabelVector {
    pub vector: LabelVector,
    pub roles: Vec<CommunicationRole>,
}

impl CommunicationLabelVector {
    pub fn new(vector: LabelVector, roles: Vec<CommunicationRole>) -> Self {
        Self { vector, roles }
    }

    /// Controller index (0-based) of the sender
    pub fn sender(&self) -> Option<usize> {
        self.roles.iter().position(|r| *r == CommunicationRole::Sender)
    }

    /// Controller indices (0-based) of the receivers
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

impl fmt::Display for CommunicationLabelVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.vector, self.roles_string())
    }
}
