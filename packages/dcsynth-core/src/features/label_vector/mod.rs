/*
 * Vector Label Algebra
 *
 * Composite event labels of the U-Structure:
 *   <e,e,*>   system move observed by controller 1 only
 *   <*,*,e>   controller 2 guesses an unobserved e
 *   <e,e,e>   communication (with per-controller roles)
 *
 * Index 0 is the plant, index i (1..=N) is controller i.
 *
 * Architecture:
 * - Domain: LabelVector, CommunicationLabelVector, CommunicationRole
 */

pub mod domain;

pub use domain::{
    format_roles, parse_roles, CommunicationLabelVector, CommunicationRole, LabelVector, WILDCARD,
};
