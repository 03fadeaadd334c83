//! Configuration System
//!
//! Two tiers:
//! - Level 1: Preset - Simple one-liner
//! - Level 2: YAML - Partial overrides on top of the Balanced defaults
//!
//! # Examples
//!
//! ```rust,ignore
//! use dcsynth_core::config::{Preset, SynthesisConfig};
//!
//! // Level 1: Simple preset
//! let config = SynthesisConfig::preset(Preset::Fast);
//!
//! // Level 2: YAML overrides
//! let config = SynthesisConfig::from_yaml_file("synthesis.yaml")?;
//! ```

pub mod error;
pub mod preset;
pub mod synthesis_config;

// Re-exports
pub use error::{ConfigError, ConfigResult};
pub use preset::Preset;
pub use synthesis_config::{
    InferenceConfig, ReachabilityPolicy, SearchConfig, SynthesisConfig, MAX_SEARCH_CANDIDATES,
};
