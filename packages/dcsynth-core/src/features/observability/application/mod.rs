/*
 * Observability Application Layer
 */

mod controllability;
mod inference;
mod observability;

pub use inference::{inference_level, InferenceOutcome};
