/*
 * Composition Domain Models
 */

mod ustructure;

pub use ustructure::{CatalogKind, UStructure};
