/*
 * Label Vector Domain Models
 */

mod communication_label;
mod label_vector;

pub use communication_label::{format_roles, parse_roles, CommunicationLabelVector, CommunicationRole};
pub use label_vector::{LabelVector, WILDCARD};
