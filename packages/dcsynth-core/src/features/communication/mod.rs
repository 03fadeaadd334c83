/*
 * Communication Classifier
 *
 * Adds the communications controllers could exchange to a U-Structure:
 * a controller that observed an event tells some of the controllers that
 * did not.
 *
 * Output catalogs:
 * - POTENTIAL_COMMUNICATION: the implied joint move lands on an existing
 *   U-state; a transition is added
 * - INVALID_COMMUNICATION: the implied tuple is not part of the structure;
 *   catalogued only
 *
 * Existing transitions are never altered.
 */

mod classifier;

pub use classifier::{CommunicationClassifier, CommunicationPattern};
