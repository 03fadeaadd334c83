/*
 * Protocol Application Layer
 */

mod feasibility;
mod pruning;
mod search;

pub use feasibility::FeasibilityChecker;
pub use search::ProtocolSearch;
