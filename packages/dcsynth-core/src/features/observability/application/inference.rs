/*
 * Control-Configuration Inference
 *
 * For a controllable event σ the U-Structure splits into enablement
 * configurations (σ legal at the plant component) and disablement
 * configurations (σ BAD there). A controller in C(σ) can settle a
 * configuration once none of the still-unsettled configurations of the
 * opposite kind look the same to it. Each round settles every such
 * configuration at once; the ambiguity level is the number of rounds
 * minus one.
 */

use crate::config::InferenceConfig;
use crate::errors::{Result, SynthesisError};
use crate::features::automaton::AutomatonView;
use crate::features::composition::UStructure;
use crate::shared::models::{EventId, StateId};
use rustc_hash::FxHashSet;
use std::hash::Hash;
use tracing::{debug, warn};

/// Result of running inference for one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceOutcome<K> {
    /// `None` when a round settles nothing or the round cap is hit
    pub level: Option<u32>,
    /// Disablement configurations left unsettled
    pub unresolved_disablements: Vec<K>,
}

/// Run inference rounds over configuration keys.
///
/// `confuses(i, a, b)` tells whether controller `i` cannot tell configuration
/// `a` from `b`.
pub fn inference_level<K, F>(
    enablements: &[K],
    disablements: &[K],
    controllers: &[usize],
    confuses: F,
    max_rounds: u32,
) -> InferenceOutcome<K>
where
    K: Copy + Eq + Hash,
    F: Fn(usize, K, K) -> bool,
{
    let mut enable: Vec<K> = enablements.to_vec();
    let mut disable: Vec<K> = disablements.to_vec();
    let mut rounds = 0u32;

    let settled = |own: K, opposite: &[K]| {
        controllers
            .iter()
            .any(|&i| !opposite.iter().any(|&other| confuses(i, own, other)))
    };

    while !enable.is_empty() || !disable.is_empty() {
        if rounds == max_rounds {
            return InferenceOutcome {
                level: None,
                unresolved_disablements: disable,
            };
        }
        rounds += 1;

        let settled_enable: FxHashSet<K> = enable
            .iter()
            .copied()
            .filter(|&k| settled(k, &disable))
            .collect();
        let settled_disable: FxHashSet<K> = disable
            .iter()
            .copied()
            .filter(|&k| settled(k, &enable))
            .collect();

        if settled_enable.is_empty() && settled_disable.is_empty() {
            return InferenceOutcome {
                level: None,
                unresolved_disablements: disable,
            };
        }
        enable.retain(|k| !settled_enable.contains(k));
        disable.retain(|k| !settled_disable.contains(k));
    }

    InferenceOutcome {
        level: Some(rounds.saturating_sub(1)),
        unresolved_disablements: Vec::new(),
    }
}

impl UStructure {
    /// Ambiguity level over all controllable events (maximum of the
    /// per-event levels). Disablement configurations that stay unsettled
    /// are recorded as illegal configurations on their U-states.
    pub fn analyze_control_configurations(
        &mut self,
        config: &InferenceConfig,
    ) -> Result<Option<u32>> {
        let n = self.n_controllers();
        let automaton = self.automaton();

        // confusion[i] holds (plant state, estimate of controller i)
        let mut confusion: Vec<FxHashSet<(StateId, StateId)>> = vec![FxHashSet::default(); n];
        let mut plant_of: Vec<(StateId, StateId)> = Vec::new();
        for id in automaton.state_ids() {
            let tuple = self.tuple(id).ok_or(SynthesisError::UnknownState(id))?;
            plant_of.push((id, tuple[0]));
            for (i, pairs) in confusion.iter_mut().enumerate() {
                pairs.insert((tuple[0], tuple[i + 1]));
            }
        }
        let plant_state = |id: StateId| {
            plant_of
                .binary_search_by_key(&id, |(s, _)| *s)
                .map(|pos| plant_of[pos].1)
                .ok()
        };
        let confuses = |i: usize, a: StateId, b: StateId| match (plant_state(a), plant_state(b)) {
            (Some(x), Some(y)) => confusion[i].contains(&(x, y)) || confusion[i].contains(&(y, x)),
            _ => false,
        };

        let mut level = Some(0u32);
        let mut illegal: Vec<(StateId, EventId)> = Vec::new();

        for (plant_event, system_event) in self.system_events() {
            let Some(event) = self.plant().event(plant_event) else {
                continue;
            };
            let controllers: Vec<usize> = event.controllers().collect();
            if controllers.is_empty() {
                continue;
            }

            let enablements: Vec<StateId> = automaton
                .states()
                .filter(|s| s.enablement_events().contains(&system_event))
                .map(|s| s.id)
                .collect();
            let disablements: Vec<StateId> = automaton
                .states()
                .filter(|s| s.disablement_events().contains(&system_event))
                .map(|s| s.id)
                .collect();

            let outcome = inference_level(
                &enablements,
                &disablements,
                &controllers,
                &confuses,
                config.max_rounds,
            );
            debug!(
                event = %event.label,
                enablements = enablements.len(),
                disablements = disablements.len(),
                level = ?outcome.level,
                "control configurations inferred"
            );

            level = match (level, outcome.level) {
                (Some(a), Some(b)) => Some(a.max(b)),
                _ => None,
            };
            illegal.extend(
                outcome
                    .unresolved_disablements
                    .into_iter()
                    .map(|s| (s, system_event)),
            );
        }

        let ids: Vec<StateId> = self.automaton().state_ids().collect();
        let automaton = self.automaton_mut();
        for id in ids {
            if let Some(state) = automaton.state_mut(id) {
                state.clear_illegal_configs();
            }
        }
        for (id, event) in illegal {
            if let Some(state) = automaton.state_mut(id) {
                state.mark_illegal_config(event);
            }
        }

        if level.is_none() {
            warn!("control configurations could not be separated");
        }
        Ok(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symmetric(pairs: &'static [(usize, char, char)]) -> impl Fn(usize, char, char) -> bool {
        move |i, a, b| {
            pairs
                .iter()
                .any(|&(c, x, y)| c == i && ((x, y) == (a, b) || (x, y) == (b, a)))
        }
    }

    #[test]
    fn test_one_sided_is_level_zero() {
        let outcome = inference_level(&['y'], &[], &[0], |_, _, _| true, 8);
        assert_eq!(outcome.level, Some(0));
        let outcome = inference_level::<char, _>(&[], &[], &[0], |_, _, _| true, 8);
        assert_eq!(outcome.level, Some(0));
    }

    #[test]
    fn test_level_one() {
        // x disables; y and z enable. Controller 0 confuses x/y, controller 1 x/z
        let confuses = symmetric(&[(0, 'x', 'y'), (1, 'x', 'z')]);
        let outcome = inference_level(&['y', 'z'], &['x'], &[0, 1], confuses, 8);
        assert_eq!(outcome.level, Some(1));
        assert!(outcome.unresolved_disablements.is_empty());
    }

    #[test]
    fn test_unresolvable() {
        let confuses = symmetric(&[(0, 'x', 'y')]);
        let outcome = inference_level(&['y'], &['x'], &[0], confuses, 8);
        assert_eq!(outcome.level, None);
        assert_eq!(outcome.unresolved_disablements, vec!['x']);
    }

    #[test]
    fn test_round_cap() {
        let confuses = symmetric(&[(0, 'x', 'y'), (1, 'x', 'z')]);
        let outcome = inference_level(&['y', 'z'], &['x'], &[0, 1], confuses, 1);
        assert_eq!(outcome.level, None);
    }
}
