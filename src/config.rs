//! Multiplier configuration.

use crate::error::{MultiplyError, Result};
use std::num::NonZeroUsize;

/// Environment variable holding the worker thread count.
pub const WORKERS_ENV: &str = "BLOCKMUL_WORKERS";

/// Environment variable holding the default number of blocks per row.
pub const BLOCKS_PER_ROW_ENV: &str = "BLOCKMUL_BLOCKS_PER_ROW";

/// Automatic block selection aims for at least this many jobs per worker.
const JOBS_PER_WORKER: usize = 2;

/// Settings for a [`ThreadedMultiplier`](crate::ThreadedMultiplier).
///
/// ```
/// use blockmul::MultiplierConfig;
///
/// let config = MultiplierConfig::new(4).with_default_blocks_per_row(5);
/// assert_eq!(config.worker_threads(), 4);
/// assert_eq!(config.blocks_per_row_for(500), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiplierConfig {
    worker_threads: usize,
    default_blocks_per_row: Option<usize>,
}

impl MultiplierConfig {
    pub fn new(worker_threads: usize) -> Self {
        Self {
            worker_threads,
            default_blocks_per_row: None,
        }
    }

    /// Block count used by [`Multiplier::multiply`](crate::Multiplier::multiply).
    pub fn with_default_blocks_per_row(mut self, blocks_per_row: usize) -> Self {
        self.default_blocks_per_row = Some(blocks_per_row);
        self
    }

    /// Reads [`WORKERS_ENV`] and [`BLOCKS_PER_ROW_ENV`], falling back to
    /// [`Default`] for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(workers) = parse_count(WORKERS_ENV, lookup(WORKERS_ENV))? {
            config.worker_threads = workers;
        }
        config.default_blocks_per_row =
            parse_count(BLOCKS_PER_ROW_ENV, lookup(BLOCKS_PER_ROW_ENV))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(MultiplyError::NoWorkers);
        }
        if self.default_blocks_per_row == Some(0) {
            return Err(MultiplyError::ZeroBlocksPerRow);
        }
        Ok(())
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn default_blocks_per_row(&self) -> Option<usize> {
        self.default_blocks_per_row
    }

    /// Block count for an `size`×`size` product.
    ///
    /// Returns the configured default when there is one. Otherwise picks the
    /// smallest divisor of `size` giving at least two jobs per worker, so
    /// small pools get coarse blocks and large pools finer ones.
    pub fn blocks_per_row_for(&self, size: usize) -> usize {
        match self.default_blocks_per_row {
            Some(blocks) => blocks,
            None => choose_blocks_per_row(size, self.worker_threads),
        }
    }
}

impl Default for MultiplierConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::new(workers)
    }
}

fn parse_count(key: &'static str, value: Option<String>) -> Result<Option<usize>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(MultiplyError::InvalidConfig { key, value: raw }),
    }
}

fn choose_blocks_per_row(size: usize, workers: usize) -> usize {
    if size == 0 {
        return 1;
    }

    let wanted_jobs = workers.saturating_mul(JOBS_PER_WORKER);

    (1..=size)
        .filter(|d| size % d == 0)
        .find(|d| d.checked_pow(3).is_none_or(|jobs| jobs >= wanted_jobs))
        .unwrap_or(size)
}
