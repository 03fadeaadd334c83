/*
 * Automaton Application Layer
 *
 * Derived automata: reachability restrictions, complement and products.
 */

mod operations;

pub use operations::{intersection, union, DUMP_STATE_LABEL};
