//! Ports injected into long-running engine operations

mod progress;

pub use progress::{CancellationFlag, NoopObserver, ProgressObserver};
