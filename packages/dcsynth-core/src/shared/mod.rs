//! Shared module - Common types and utilities
//!
//! This module contains types that are shared across all features.

pub mod models;
pub mod parallel;
pub mod ports;

// Re-exports for convenience
pub use models::*;
pub use parallel::{build_pool, worker_count};
pub use ports::{CancellationFlag, NoopObserver, ProgressObserver};
