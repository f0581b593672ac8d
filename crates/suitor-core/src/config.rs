//! Engine configuration.

use std::thread;

use crate::error::{MatchError, MatchResult};

/// Upper bound on the worker pool size. Well beyond anything useful for a
/// lock-based pool; mostly catches garbage from the CLI surface.
pub const MAX_WORKERS: usize = 1024;

/// Configuration for the parallel matching engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of OS worker threads sharing the work queue.
    pub workers: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self { workers }
    }
}

impl EngineConfig {
    /// Create a configuration with an explicit worker count.
    #[must_use]
    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }

    /// Validate the configuration before any work begins.
    ///
    /// # Errors
    ///
    /// `MatchError::InvalidConfig` if the worker count is zero or exceeds
    /// [`MAX_WORKERS`].
    pub fn validate(&self) -> MatchResult<()> {
        if self.workers == 0 {
            return Err(MatchError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.workers > MAX_WORKERS {
            return Err(MatchError::InvalidConfig(format!(
                "workers = {} exceeds the maximum of {}",
                self.workers, MAX_WORKERS
            )));
        }
        Ok(())
    }
}
