/*
 * Protocol Search
 *
 * Enumerates subsets of a candidate list and keeps the feasible ones,
 * or, for the size and cost driven searches, the ones that also solve the
 * control problem.
 *
 * Encoding:
 * - Candidate i ↔ bit (n - 1 - i) of a u64 mask
 * - Ascending masks = encounter order (first candidate decided last)
 * - Only non-empty subsets are reported, except that an empty candidate
 *   list yields the empty protocol when it solves the control problem
 *
 * Parallelism:
 * - Each mask is evaluated independently against a shared read-only
 *   FeasibilityChecker, on rayon when `SearchConfig::use_parallel` says so
 * - Results are reassembled in mask order, so output is deterministic
 */

use super::feasibility::FeasibilityChecker;
use crate::config::{SearchConfig, MAX_SEARCH_CANDIDATES};
use crate::errors::{Result, SynthesisError};
use crate::features::automaton::CommunicationData;
use crate::features::composition::UStructure;
use crate::features::protocol::domain::Protocol;
use crate::shared::parallel::build_pool;
use crate::shared::ports::{NoopObserver, ProgressObserver};
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Progress is reported every this many evaluated subsets
const PROGRESS_STRIDE: u64 = 1024;

const COST_EPSILON: f64 = 1e-9;

static NOOP: NoopObserver = NoopObserver;

/// What a subset must satisfy to be kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Goal {
    Feasible,
    Solving,
}

pub struct ProtocolSearch<'a> {
    ustructure: &'a UStructure,
    config: SearchConfig,
    observer: &'a dyn ProgressObserver,
}

impl<'a> ProtocolSearch<'a> {
    pub fn new(ustructure: &'a UStructure, config: SearchConfig) -> Self {
        Self {
            ustructure,
            config,
            observer: &NOOP,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Every feasible protocol drawn from `candidates`, in encounter order.
    /// With `filter_unnecessary`, protocols that strictly contain another
    /// feasible protocol are dropped.
    pub fn all_feasible(
        &self,
        candidates: &[CommunicationData],
        filter_unnecessary: bool,
    ) -> Result<Vec<Protocol>> {
        let masks = self.feasible_subsets(candidates, Goal::Feasible)?;
        let masks = if filter_unnecessary {
            minimal_masks(&masks)
        } else {
            masks
        };
        info!(
            candidates = candidates.len(),
            feasible = masks.len(),
            filtered = filter_unnecessary,
            "feasible protocols enumerated"
        );
        Ok(to_protocols(candidates, &masks))
    }

    /// Protocols of minimum size that solve the control problem
    pub fn smallest_feasible(&self, candidates: &[CommunicationData]) -> Result<Vec<Protocol>> {
        let masks = smallest_masks(&self.feasible_subsets(candidates, Goal::Solving)?);
        Ok(to_protocols(candidates, &masks))
    }

    /// First feasible protocol in encounter order
    pub fn first_feasible(&self, candidates: &[CommunicationData]) -> Result<Option<Protocol>> {
        let checker = self.prepare(candidates)?;
        let n = candidates.len();
        if n == 0 {
            return Ok(checker.solves_control_problem(&[])?.then(Protocol::empty));
        }

        let total = 1u64 << n;
        let progress = Progress::new(self.observer, total - 1);
        let evaluate = |mask: u64| -> Option<Result<u64>> {
            match self.evaluate(&checker, candidates, mask, Goal::Feasible, &progress) {
                Ok(true) => Some(Ok(mask)),
                Ok(false) => None,
                Err(e) => Some(Err(e)),
            }
        };

        let found = if self.config.use_parallel(n) {
            self.run(|| (1..total).into_par_iter().find_map_first(evaluate))?
        } else {
            (1..total).find_map(evaluate)
        };

        match found {
            Some(Ok(mask)) => Ok(Some(Protocol::new(members(candidates, mask)))),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    /// Smallest protocols solving the control problem that contain every
    /// communication of `partial`, completed from `candidates`
    pub fn make_feasible(
        &self,
        partial: &[CommunicationData],
        candidates: &[CommunicationData],
    ) -> Result<Vec<Protocol>> {
        let n = candidates.len();
        let mut required = 0u64;
        for communication in partial {
            let position = candidates
                .iter()
                .position(|c| c == communication)
                .ok_or_else(|| {
                    SynthesisError::operation_failed(format!(
                        "{} is not a candidate communication",
                        communication.transition
                    ))
                })?;
            required |= 1 << (n - 1 - position);
        }

        let checker = self.prepare(candidates)?;
        let masks = smallest_masks(&self.feasible_supersets(&checker, candidates, required, Goal::Solving)?);
        debug!(required = partial.len(), completions = masks.len(), "protocol completed");
        Ok(to_protocols(candidates, &masks))
    }

    /// Protocols solving the control problem at minimum expected cost
    /// (Nash members only contribute cost)
    pub fn lowest_cost_feasible(&self, candidates: &[CommunicationData]) -> Result<Vec<Protocol>> {
        let masks = self.feasible_subsets(candidates, Goal::Solving)?;
        let protocols = to_protocols(candidates, &masks);
        let costs: Vec<f64> = protocols
            .iter()
            .map(|p| p.expected_cost(self.ustructure))
            .collect();
        let Some(best) = costs.iter().copied().reduce(f64::min) else {
            return Ok(Vec::new());
        };
        Ok(protocols
            .into_iter()
            .zip(costs)
            .filter(|(_, cost)| (cost - best).abs() <= COST_EPSILON)
            .map(|(p, _)| p)
            .collect())
    }

    // ========================================================================
    // Enumeration
    // ========================================================================

    fn feasible_subsets(&self, candidates: &[CommunicationData], goal: Goal) -> Result<Vec<u64>> {
        let checker = self.prepare(candidates)?;
        let mut masks = self.feasible_supersets(&checker, candidates, 0, goal)?;
        if !candidates.is_empty() {
            masks.retain(|&m| m != 0);
        }
        Ok(masks)
    }

    /// Masks meeting `goal` that contain `required`, ascending
    fn feasible_supersets(
        &self,
        checker: &FeasibilityChecker<'_>,
        candidates: &[CommunicationData],
        required: u64,
        goal: Goal,
    ) -> Result<Vec<u64>> {
        let n = candidates.len();
        let free: Vec<u32> = (0..n as u32).filter(|&b| required >> b & 1 == 0).collect();
        let total = 1u64 << free.len();
        let progress = Progress::new(self.observer, total);

        let evaluate = |k: u64| -> Result<Option<u64>> {
            let mask = scatter(required, &free, k);
            Ok(self
                .evaluate(checker, candidates, mask, goal, &progress)?
                .then_some(mask))
        };

        let results: Vec<Option<u64>> = if self.config.use_parallel(n) {
            self.run(|| (0..total).into_par_iter().map(evaluate).collect::<Result<Vec<_>>>())??
        } else {
            (0..total).map(evaluate).collect::<Result<Vec<_>>>()?
        };

        let mut masks: Vec<u64> = results.into_iter().flatten().collect();
        masks.sort_unstable();
        Ok(masks)
    }

    fn evaluate(
        &self,
        checker: &FeasibilityChecker<'_>,
        candidates: &[CommunicationData],
        mask: u64,
        goal: Goal,
        progress: &Progress<'_>,
    ) -> Result<bool> {
        if self.observer.is_cancelled() {
            return Err(SynthesisError::Cancelled);
        }
        let protocol = members(candidates, mask);
        // The empty protocol only counts when nothing needs to be prevented
        let kept = if goal == Goal::Solving || protocol.is_empty() {
            checker.solves_control_problem(&protocol)?
        } else {
            checker.is_feasible(&protocol)?
        };
        progress.tick();
        Ok(kept)
    }

    fn prepare(&self, candidates: &[CommunicationData]) -> Result<FeasibilityChecker<'a>> {
        let limit = self.config.max_candidates.min(MAX_SEARCH_CANDIDATES);
        if candidates.len() > limit {
            return Err(SynthesisError::operation_failed(format!(
                "{} candidate communications exceed the search limit of {}",
                candidates.len(),
                limit
            )));
        }
        if let Some(stranger) = candidates.iter().find(|c| !self.ustructure.is_candidate(c)) {
            return Err(SynthesisError::operation_failed(format!(
                "{} is not a candidate communication",
                stranger.transition
            )));
        }
        Ok(FeasibilityChecker::new(
            self.ustructure,
            self.config.reachability,
        ))
    }

    fn run<T: Send>(&self, job: impl FnOnce() -> T + Send) -> Result<T> {
        if self.config.num_threads > 0 {
            Ok(build_pool(self.config.num_threads)?.install(job))
        } else {
            Ok(job())
        }
    }
}

struct Progress<'a> {
    observer: &'a dyn ProgressObserver,
    done: AtomicU64,
    total: u64,
}

impl<'a> Progress<'a> {
    fn new(observer: &'a dyn ProgressObserver, total: u64) -> Self {
        Self {
            observer,
            done: AtomicU64::new(0),
            total,
        }
    }

    fn tick(&self) {
        let completed = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if completed % PROGRESS_STRIDE == 0 || completed == self.total {
            self.observer.on_progress(completed, self.total);
        }
    }
}

/// Spread the bits of `k` over the `free` positions (ascending) on top of `base`
fn scatter(base: u64, free: &[u32], k: u64) -> u64 {
    free.iter()
        .enumerate()
        .filter(|(j, _)| k >> j & 1 == 1)
        .fold(base, |mask, (_, &bit)| mask | 1 << bit)
}

fn members(candidates: &[CommunicationData], mask: u64) -> Vec<CommunicationData> {
    let n = candidates.len();
    candidates
        .iter()
        .enumerate()
        .filter(|(i, _)| mask >> (n - 1 - i) & 1 == 1)
        .map(|(_, c)| c.clone())
        .collect()
}

fn to_protocols(candidates: &[CommunicationData], masks: &[u64]) -> Vec<Protocol> {
    masks
        .iter()
        .map(|&m| Protocol::new(members(candidates, m)))
        .collect()
}

/// Masks with no proper subset in the list
fn minimal_masks(masks: &[u64]) -> Vec<u64> {
    masks
        .iter()
        .copied()
        .filter(|&m| !masks.iter().any(|&o| o != m && o & m == o))
        .collect()
}

fn smallest_masks(masks: &[u64]) -> Vec<u64> {
    let Some(min) = masks.iter().map(|m| m.count_ones()).min() else {
        return Vec::new();
    };
    masks
        .iter()
        .copied()
        .filter(|m| m.count_ones() == min)
        .collect()
}

impl UStructure {
    pub fn generate_all_feasible_protocols(
        &self,
        candidates: &[CommunicationData],
        filter_unnecessary: bool,
    ) -> Result<Vec<Protocol>> {
        ProtocolSearch::new(self, SearchConfig::default()).all_feasible(candidates, filter_unnecessary)
    }

    pub fn generate_smallest_feasible_protocols(
        &self,
        candidates: &[CommunicationData],
    ) -> Result<Vec<Protocol>> {
        ProtocolSearch::new(self, SearchConfig::default()).smallest_feasible(candidates)
    }

    pub fn generate_feasible_protocol(
        &self,
        candidates: &[CommunicationData],
    ) -> Result<Option<Protocol>> {
        ProtocolSearch::new(self, SearchConfig::default()).first_feasible(candidates)
    }

    /// Completions drawn from all of this structure's candidates
    pub fn make_protocol_feasible(&self, partial: &Protocol) -> Result<Vec<Protocol>> {
        ProtocolSearch::new(self, SearchConfig::default())
            .make_feasible(partial.communications(), &self.candidates())
    }

    pub fn lowest_cost_feasible_protocols(
        &self,
        candidates: &[CommunicationData],
    ) -> Result<Vec<Protocol>> {
        ProtocolSearch::new(self, SearchConfig::default()).lowest_cost_feasible(candidates)
    }
}
