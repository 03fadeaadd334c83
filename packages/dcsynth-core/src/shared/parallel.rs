//! Rayon thread pool sizing for protocol search
//!
//! The search either runs on the global rayon pool or, when a worker count
//! is configured, on a dedicated pool built here.

use crate::errors::{Result, SynthesisError};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Resolve the number of workers: `0` means one per CPU core
pub fn worker_count(requested: usize) -> usize {
    if requested == 0 {
        num_cpus::get().max(1)
    } else {
        requested
    }
}

/// Build a dedicated pool with `worker_count(requested)` threads
pub fn build_pool(requested: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(worker_count(requested))
        .thread_name(|i| format!("dcsynth-worker-{}", i))
        .build()
        .map_err(|e| SynthesisError::operation_failed(format!("Failed to build thread pool: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count_defaults_to_cpus() {
        assert_eq!(worker_count(0), num_cpus::get().max(1));
        assert_eq!(worker_count(3), 3);
    }

    #[test]
    fn test_build_pool_runs_work() {
        let pool = build_pool(2).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
        assert_eq!(pool.install(|| 40 + 2), 42);
    }
}
