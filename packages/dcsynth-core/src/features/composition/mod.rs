/*
 * Synchronized Composition
 *
 * Builds the U-Structure of a plant with N controllers: states are tuples
 * (plant, estimate_1, ..., estimate_N) and every transition carries a
 * vector label describing which components move.
 *
 * Architecture:
 * - Domain: UStructure (automaton + violation / communication catalogs)
 * - Application: SynchronizedComposition (BFS product builder)
 *
 * Algorithm:
 * - Frontier of unexplored tuples with a tuple -> state ID map
 * - Plant moves advance the plant and every observing controller
 * - Unobservable moves advance a single estimate
 * - BAD plant moves are classified against the controllers' estimates
 *
 * Performance:
 * - Time: O(|U| × |Σ| × N)
 * - Space: O(|U| × N) for the tuple map
 */

pub mod application;
pub mod domain;

pub use application::SynchronizedComposition;
pub use domain::{CatalogKind, UStructure};
