/*
 * Observability Domain Models
 */

mod report;

pub use report::ObservabilityReport;
