/*
 * Observability & Controllability
 *
 * - Controllability: every reachable BAD plant transition can be blocked
 *   by at least one controller
 * - Observability: the U-Structure has no unconditional violation
 * - Ambiguity level: rounds of control-configuration inference needed to
 *   separate enablement from disablement configurations
 */

pub mod application;
pub mod domain;

pub use application::{inference_level, InferenceOutcome};
pub use domain::ObservabilityReport;
