//! Identifier types
//!
//! IDs are 1-based and minted monotonically by the owning automaton.
//! Zero is reserved as the "none" sentinel.

/// State identifier (1-based)
pub type StateId = u64;

/// Event identifier (1-based)
pub type EventId = u32;

/// Sentinel for "no state" (e.g. the target of a disabled move)
pub const NO_STATE: StateId = 0;

/// Sentinel for "no event"
pub const NO_EVENT: EventId = 0;
