//! Configuration loading: presets, YAML files, validation

use dcsynth_core::config::{
    ConfigError, Preset, ReachabilityPolicy, SearchConfig, SynthesisConfig,
};
use pretty_assertions::assert_eq;
use std::io::Write;

#[test]
fn test_yaml_file_overrides_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "search:\n  max_candidates: 16\n  reachability: strict\ninference:\n  max_rounds: 4"
    )
    .unwrap();

    let config = SynthesisConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.search.max_candidates, 16);
    assert_eq!(config.search.reachability, ReachabilityPolicy::Strict);
    assert_eq!(config.inference.max_rounds, 4);
    // Untouched fields keep the Balanced defaults
    assert_eq!(
        config.search.parallel_threshold,
        SearchConfig::default().parallel_threshold
    );
}

#[test]
fn test_yaml_roundtrip() {
    let config = SynthesisConfig::preset(Preset::Thorough);
    let yaml = config.to_yaml().unwrap();
    assert_eq!(SynthesisConfig::from_yaml_str(&yaml).unwrap(), config);
}

#[test]
fn test_out_of_range_rejected() {
    let result = SynthesisConfig::from_yaml_str("search:\n  max_candidates: 64\n");
    assert!(matches!(result, Err(ConfigError::Range { .. })));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = SynthesisConfig::from_yaml_file(dir.path().join("absent.yaml"));
    assert!(result.is_err());
}
