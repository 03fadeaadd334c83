//! Stage-specific configuration types
//!
//! One struct per engine stage, each with preset defaults and validation.

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hard ceiling on candidates: masks are `u64`
pub const MAX_SEARCH_CANDIDATES: usize = 63;

// ============================================================================
// Protocol search
// ============================================================================

/// How reachable unconditional violations are judged when deciding whether
/// a feasible protocol solves the control problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReachabilityPolicy {
    /// Only violations still reachable after pruning count; a protocol that
    /// disconnects a violation resolves it
    #[default]
    ReachableOnly,

    /// Reachability is measured with the candidates outside the protocol
    /// left in place, so a violation an unused communication leads to counts
    Strict,
}

/// Protocol search configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Evaluate candidate subsets on the rayon pool
    pub parallel: bool,

    /// Minimum candidate count before going parallel (1..=63)
    pub parallel_threshold: usize,

    /// Reject candidate sets larger than this (1..=63)
    pub max_candidates: usize,

    /// Dedicated pool size (0 = global rayon pool)
    pub num_threads: usize,

    pub reachability: ReachabilityPolicy,
}

impl SearchConfig {
    /// Get preset configuration
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                parallel: true,
                parallel_threshold: 10,
                max_candidates: 12,
                num_threads: 0,
                reachability: ReachabilityPolicy::ReachableOnly,
            },
            Preset::Balanced => Self {
                parallel: true,
                parallel_threshold: 10,
                max_candidates: 20,
                num_threads: 0,
                reachability: ReachabilityPolicy::ReachableOnly,
            },
            Preset::Thorough => Self {
                parallel: true,
                parallel_threshold: 8,
                max_candidates: 30,
                num_threads: 0,
                reachability: ReachabilityPolicy::ReachableOnly,
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_candidates == 0 || self.max_candidates > MAX_SEARCH_CANDIDATES {
            return Err(ConfigError::range_with_hint(
                "search.max_candidates",
                self.max_candidates,
                1,
                MAX_SEARCH_CANDIDATES,
                "Protocols are enumerated as 64-bit masks",
            ));
        }
        if self.parallel_threshold == 0 || self.parallel_threshold > MAX_SEARCH_CANDIDATES {
            return Err(ConfigError::range_with_hint(
                "search.parallel_threshold",
                self.parallel_threshold,
                1,
                MAX_SEARCH_CANDIDATES,
                "Threshold is a candidate count",
            ));
        }
        if self.num_threads > 1024 {
            return Err(ConfigError::range_with_hint(
                "search.num_threads",
                self.num_threads,
                0,
                1024,
                "Use 0 for the global pool",
            ));
        }
        Ok(())
    }

    /// Whether a search over `n_candidates` should run on rayon
    pub fn use_parallel(&self, n_candidates: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && n_candidates >= self.parallel_threshold
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

// ============================================================================
// Control-configuration inference
// ============================================================================

/// Ambiguity-level inference configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Round cap (1..=10000); exceeding it yields no level
    pub max_rounds: u32,
}

impl InferenceConfig {
    /// Get preset configuration
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self { max_rounds: 8 },
            Preset::Balanced => Self { max_rounds: 32 },
            Preset::Thorough => Self { max_rounds: 128 },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_rounds == 0 || self.max_rounds > 10_000 {
            return Err(ConfigError::range_with_hint(
                "inference.max_rounds",
                self.max_rounds,
                1,
                10_000,
                "At least one inference round is required",
            ));
        }
        Ok(())
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

// ============================================================================
// Top level
// ============================================================================

/// Complete engine configuration
///
/// ```yaml
/// preset: thorough
/// search:
///   max_candidates: 24
///   reachability: strict
/// ```
///
/// Omitted sections fall back to the Balanced defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub preset: Preset,
    pub search: SearchConfig,
    pub inference: InferenceConfig,
}

impl SynthesisConfig {
    /// Full configuration for a preset
    pub fn preset(preset: Preset) -> Self {
        Self {
            preset,
            search: SearchConfig::from_preset(preset),
            inference: InferenceConfig::from_preset(preset),
        }
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate every stage
    pub fn validate(&self) -> ConfigResult<()> {
        self.search.validate()?;
        self.inference.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for preset in [Preset::Fast, Preset::Balanced, Preset::Thorough] {
            assert!(SynthesisConfig::preset(preset).validate().is_ok());
        }
    }

    #[test]
    fn test_preset_ordering() {
        let fast = SynthesisConfig::preset(Preset::Fast);
        let thorough = SynthesisConfig::preset(Preset::Thorough);
        assert!(fast.search.max_candidates < thorough.search.max_candidates);
        assert!(fast.inference.max_rounds < thorough.inference.max_rounds);
    }

    #[test]
    fn test_max_candidates_range() {
        let mut search = SearchConfig::default();
        search.max_candidates = 64;
        assert!(matches!(search.validate(), Err(ConfigError::Range { .. })));

        search.max_candidates = 0;
        assert!(search.validate().is_err());
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let inference = InferenceConfig { max_rounds: 0 };
        assert!(inference.validate().is_err());
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = "search:\n  max_candidates: 24\n  reachability: strict\n";
        let config = SynthesisConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.search.max_candidates, 24);
        assert_eq!(config.search.reachability, ReachabilityPolicy::Strict);
        // Untouched fields keep Balanced defaults
        assert_eq!(config.search.parallel_threshold, 10);
        assert_eq!(config.inference.max_rounds, 32);
    }

    #[test]
    fn test_yaml_invalid_range() {
        let yaml = "inference:\n  max_rounds: 0\n";
        assert!(matches!(
            SynthesisConfig::from_yaml_str(yaml),
            Err(ConfigError::Range { .. })
        ));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = SynthesisConfig::preset(Preset::Thorough);
        let yaml = config.to_yaml().unwrap();
        let back = SynthesisConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_parallel_threshold() {
        let search = SearchConfig::from_preset(Preset::Fast);
        assert!(!search.use_parallel(3));
        assert_eq!(search.use_parallel(10), cfg!(feature = "parallel"));
    }
}
