/*
 * Protocol
 *
 * Ordered set of communications (order follows the candidate list it was
 * drawn from).
 */

use crate::features::automaton::CommunicationData;
use crate::features::composition::UStructure;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Protocol {
    communications: Vec<CommunicationData>,
}

impl Protocol {
    /// Duplicates are dropped, first occurrence wins
    pub fn new(communications: Vec<CommunicationData>) -> Self {
        let mut unique: Vec<CommunicationData> = Vec::with_capacity(communications.len());
        for c in communications {
            if !unique.contains(&c) {
                unique.push(c);
            }
        }
        Self {
            communications: unique,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn communications(&self) -> &[CommunicationData] {
        &self.communications
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CommunicationData> {
        self.communications.iter()
    }

    pub fn len(&self) -> usize {
        self.communications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communications.is_empty()
    }

    pub fn contains(&self, communication: &CommunicationData) -> bool {
        self.communications.contains(communication)
    }

    pub fn is_subset_of(&self, other: &Protocol) -> bool {
        self.communications.iter().all(|c| other.contains(c))
    }

    /// Σ cost × probability over Nash members; potential communications cost 0
    pub fn expected_cost(&self, ustructure: &UStructure) -> f64 {
        self.communications
            .iter()
            .filter_map(|c| {
                ustructure
                    .nash_communications()
                    .iter()
                    .find(|n| &n.communication == c)
            })
            .map(|n| n.expected_cost())
            .sum()
    }
}

impl FromIterator<CommunicationData> for Protocol {
    fn from_iter<I: IntoIterator<Item = CommunicationData>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Protocol {
    type Item = &'a CommunicationData;
    type IntoIter = std::slice::Iter<'a, CommunicationData>;

    fn into_iter(self) -> Self::IntoIter {
        self.communications.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::automaton::TransitionData;
    use crate::features::label_vector::parse_roles;

    fn comm(source: u64) -> CommunicationData {
        CommunicationData::new(TransitionData::new(source, 1, 9), parse_roles("SR").unwrap())
    }

    #[test]
    fn test_duplicates_dropped() {
        let p = Protocol::new(vec![comm(1), comm(2), comm(1)]);
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn test_subset() {
        let small: Protocol = [comm(1)].into_iter().collect();
        let large: Protocol = [comm(2), comm(1)].into_iter().collect();
        assert!(small.is_subset_of(&large));
        assert!(!large.is_subset_of(&small));
        assert!(Protocol::empty().is_subset_of(&small));
    }
}
