/*
 * Protocol Domain Models
 */

mod protocol;
mod pruned;

pub use protocol::Protocol;
pub use pruned::PrunedUStructure;
