//! Block-parallel multiplier on a persistent worker pool.

use super::job::{BlockJob, Operands};
use super::pool::WorkerPool;
use super::queue::QueueStats;
use crate::Multiplier;
use crate::blocked::BlockGrid;
use crate::config::MultiplierConfig;
use crate::error::{MultiplyError, Result};
use crate::matrix::{Element, SquareMatrix};
use parking_lot::Mutex;

/// Multiplies square matrices by splitting them into blocks and running the
/// blocks on a fixed pool of worker threads.
///
/// `multiply` is reentrant: any number of threads may call it at once on the
/// same instance (share it with `Arc` or scoped threads). Each call gets its
/// own computation id and only waits for its own jobs.
///
/// Dropping the multiplier stops and joins every worker. Since `multiply`
/// borrows `self`, a drop can't happen while a call is still waiting.
///
/// ```
/// use blockmul::{Multiplier, MultiplierConfig, SquareMatrix, ThreadedMultiplier};
///
/// let multiplier = ThreadedMultiplier::new(MultiplierConfig::new(4)).unwrap();
///
/// let a = SquareMatrix::from_fn(6, |x, y| (x + y) as i64);
/// let b = SquareMatrix::from_fn(6, |x, y| i64::from(x == y));
/// let mut c = SquareMatrix::new(6);
///
/// multiplier.multiply_with_blocks(&a, &b, &mut c, 3).unwrap();
/// assert_eq!(c, a);
/// ```
pub struct ThreadedMultiplier<T: Element> {
    config: MultiplierConfig,
    pool: WorkerPool<T>,
}

impl<T: Element> ThreadedMultiplier<T> {
    /// Starts `config.worker_threads()` workers.
    pub fn new(config: MultiplierConfig) -> Result<Self> {
        config.validate()?;
        let pool = WorkerPool::new(config.worker_threads())?;
        Ok(Self { config, pool })
    }

    /// Shorthand for [`new`](Self::new) with a worker count and no default
    /// block count.
    pub fn with_workers(worker_threads: usize) -> Result<Self> {
        Self::new(MultiplierConfig::new(worker_threads))
    }

    pub fn config(&self) -> &MultiplierConfig {
        &self.config
    }

    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    pub fn stats(&self) -> QueueStats {
        self.pool.queue().stats()
    }

    /// Computes `C := A × B` using `blocks_per_row` blocks per side.
    ///
    /// C is zeroed first, then `blocks_per_row³` jobs are queued and the call
    /// blocks until all of them have been accumulated. Rejected without
    /// touching C if the sizes differ or `blocks_per_row` is zero or does not
    /// divide the matrix size. An empty product returns at once and queues
    /// nothing.
    ///
    /// Accumulation into C is serialized by one lock per call. Calls don't
    /// contend with each other, but within a call that lock becomes the
    /// bottleneck once workers far outnumber output blocks.
    #[tracing::instrument(skip(self, a, b, c), fields(size = a.size()))]
    pub fn multiply_with_blocks(
        &self,
        a: &SquareMatrix<T>,
        b: &SquareMatrix<T>,
        c: &mut SquareMatrix<T>,
        blocks_per_row: usize,
    ) -> Result<()> {
        crate::check_sizes(a, b, c)?;
        let grid = BlockGrid::new(a.size(), blocks_per_row)?;
        if grid.size() == 0 {
            return Ok(());
        }

        // Jobs add into C, so stale contents must go
        c.fill(T::zero());

        let operands = Operands {
            a,
            b,
            c: Mutex::new(c),
        };

        let queue = self.pool.queue();
        let id = queue.register_computation(grid.job_count());

        // SAFETY: `operands` lives on this frame until `await_completion`
        // returns, which happens only after every job below has been reported.
        queue.enqueue_all(
            grid.blocks()
                .map(|block| unsafe { BlockJob::new(id, block, grid.block_size(), &operands) }),
        );

        let completion = queue.await_completion(id);

        if completion.failed_jobs > 0 {
            return Err(MultiplyError::JobsPanicked {
                failed: completion.failed_jobs,
                total: completion.total_jobs,
            });
        }
        Ok(())
    }
}

impl<T: Element> Multiplier<T> for ThreadedMultiplier<T> {
    /// Uses the configured block count, or an automatic one when none is set.
    fn multiply(
        &self,
        a: &SquareMatrix<T>,
        b: &SquareMatrix<T>,
        c: &mut SquareMatrix<T>,
    ) -> Result<()> {
        let blocks_per_row = self.config.blocks_per_row_for(a.size());
        self.multiply_with_blocks(a, b, c, blocks_per_row)
    }
}
