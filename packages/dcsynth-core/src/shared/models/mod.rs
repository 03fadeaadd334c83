//! Shared models

mod ids;
mod sequence;

pub use ids::{EventId, StateId, NO_EVENT, NO_STATE};
pub use sequence::Sequence;
