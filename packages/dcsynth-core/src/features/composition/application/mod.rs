/*
 * Composition Application Layer
 */

mod synchronized_composition;

pub use synchronized_composition::SynchronizedComposition;
