//! Rayon thread pool configuration for rendering many views at once.
//!
//! Use [WorkerPool::install] to run a parallel batch with a fixed number of threads, or rely
//! on Rayon's default (all CPU cores).

use rayon::ThreadPoolBuilder;
use tracing::warn;

/// Configures how many worker threads render views in parallel.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use Rayon default (num_cpus).
    pub workers: usize,
}

impl WorkerPool {
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Run a closure on a pool with this worker count. With 0 workers, or when a dedicated
    /// pool cannot be built, the global Rayon pool is used.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                warn!(workers = self.workers, error = %err, "falling back to global pool");
                f()
            }
        }
    }
}
