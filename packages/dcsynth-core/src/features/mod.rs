//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure business logic (no external dependencies)
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - External dependency implementations
//!
//! Pipeline: automaton → composition → communication → protocol, with
//! observability built on composition.

pub mod automaton;
pub mod label_vector;

// Synchronized composition into U-Structures
pub mod composition;

// Communication classification and protocol search
pub mod communication;
pub mod protocol;

pub mod observability;
