//! Common test utilities for dcsynth-core
//!
//! This module provides shared fixtures and assertions
//! for integration tests.

#![allow(dead_code)]

mod assertions;
mod fixtures;

// Re-export all utilities
pub use assertions::*;
pub use fixtures::*;
