/*
 * Protocol Feasibility Search
 *
 * A protocol is a subset of a U-Structure's candidate communications.
 * Applying it replaces, at each member's source state, the moves the
 * communication stands for; a protocol is feasible when its members stay
 * reachable and every sender behaves consistently across states it cannot
 * tell apart. It solves the control problem when, in addition, no
 * unconditional violation stays reachable.
 *
 * Architecture:
 * - Domain: Protocol, PrunedUStructure
 * - Application: pruning (apply_protocol), FeasibilityChecker,
 *   ProtocolSearch (powerset enumeration on rayon)
 *
 * Algorithm:
 * - Subsets are u64 masks, candidate 0 in the most significant bit, so
 *   ascending masks visit subsets in exclude-before-include order
 * - Each mask is pruned and checked independently (no shared mutation)
 *
 * Performance:
 * - Time: O(2^C × (|U| + |T|)) for C candidates
 * - Space: O(|U| + |T|) per worker
 */

pub mod application;
pub mod domain;

pub use application::{FeasibilityChecker, ProtocolSearch};
pub use domain::{Protocol, PrunedUStructure};
