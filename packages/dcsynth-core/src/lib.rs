/*
 * dcsynth - Decentralized Control Synthesis Engine
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (IDs, Sequence), ports (progress), rayon pools
 * - features/    : Vertical slices (automaton → composition → communication → protocol)
 * - config/      : Presets + YAML overrides
 * - errors       : Unified error type
 *
 * Performance:
 * - Rayon work-stealing for protocol enumeration
 * - FxHash tables for composition dedup
 */

#![allow(clippy::type_complexity)] // Composition tables
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::module_inception)] // Module naming intentional

/// Shared models and utilities
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{InferenceConfig, Preset, ReachabilityPolicy, SearchConfig, SynthesisConfig};
pub use errors::{Result, SynthesisError};
pub use features::automaton::{
    intersection, union, Automaton, AutomatonView, CommunicationData, DisablementData, Event,
    NashCommunicationData, State, TextFormat, Transition, TransitionData, TransitionRecord,
};
pub use features::communication::CommunicationClassifier;
pub use features::composition::{CatalogKind, SynchronizedComposition, UStructure};
pub use features::label_vector::{CommunicationLabelVector, CommunicationRole, LabelVector};
pub use features::observability::ObservabilityReport;
pub use features::protocol::{FeasibilityChecker, Protocol, ProtocolSearch, PrunedUStructure};
pub use shared::models::{EventId, Sequence, StateId, NO_EVENT, NO_STATE};
pub use shared::ports::{CancellationFlag, NoopObserver, ProgressObserver};
