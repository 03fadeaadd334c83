use crate::features::automaton::TransitionData;
use crate::shared::models::Sequence;
use serde::Serialize;

/// Outcome of an observability test on a plant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservabilityReport {
    pub observable: bool,
    /// Inference rounds needed, when requested and resolvable
    pub ambiguity_level: Option<u32>,
    pub unconditional_violations: Vec<TransitionData>,
    /// Shortest run to each violation, same order as the violations
    pub witnesses: Vec<Sequence>,
}

impl ObservabilityReport {
    pub fn n_violations(&self) -> usize {
        self.unconditional_violations.len()
    }
}
