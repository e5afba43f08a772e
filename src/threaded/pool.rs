//! Persistent worker threads draining a shared [`JobQueue`].
//!
//! Threads are spawned once and live until the pool is dropped. Drop closes
//! the queue and joins every thread, so no worker outlives its pool.

use super::job::BlockJob;
use super::queue::JobQueue;
use crate::error::{MultiplyError, Result};
use crate::matrix::Element;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub(crate) struct WorkerPool<T: Element> {
    queue: Arc<JobQueue<BlockJob<T>>>,
    workers: Vec<JoinHandle<()>>,
}

impl<T: Element> WorkerPool<T> {
    /// Starts `worker_threads` workers on a fresh queue.
    ///
    /// If a spawn fails, the workers already started are shut down and joined
    /// before the error is returned.
    pub(crate) fn new(worker_threads: usize) -> Result<Self> {
        if worker_threads == 0 {
            return Err(MultiplyError::NoWorkers);
        }

        let mut pool = Self {
            queue: Arc::new(JobQueue::new()),
            workers: Vec::with_capacity(worker_threads),
        };

        for id in 0..worker_threads {
            let queue = Arc::clone(&pool.queue);
            let handle = thread::Builder::new()
                .name(format!("blockmul-worker-{id}"))
                .spawn(move || worker_loop(id, &queue))?;
            pool.workers.push(handle);
        }

        tracing::info!(workers = worker_threads, "worker pool started");
        Ok(pool)
    }

    pub(crate) fn queue(&self) -> &JobQueue<BlockJob<T>> {
        &self.queue
    }

    pub(crate) fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Closes the queue and joins all workers. Returns how many were joined;
    /// later calls join nothing.
    pub(crate) fn shutdown(&mut self) -> usize {
        self.queue.request_shutdown();

        let mut joined = 0;
        for handle in self.workers.drain(..) {
            let name = handle.thread().name().map(str::to_owned);
            if handle.join().is_err() {
                tracing::error!(worker = ?name, "worker thread panicked outside a job");
            }
            joined += 1;
        }

        if joined > 0 {
            tracing::info!(workers = joined, "worker pool stopped");
        }
        joined
    }
}

impl<T: Element> Drop for WorkerPool<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop<T: Element>(id: usize, queue: &JobQueue<BlockJob<T>>) {
    tracing::debug!(worker = id, "worker started");
    let mut processed = 0usize;

    while let Some(job) = queue.dequeue() {
        let computation = job.computation();
        tracing::trace!(worker = id, %computation, block = ?job.block(), "running job");

        match panic::catch_unwind(AssertUnwindSafe(|| job.run())) {
            Ok(()) => queue.notify_job_done(computation),
            Err(_) => {
                tracing::error!(worker = id, %computation, block = ?job.block(), "block job panicked");
                queue.notify_job_failed(computation);
            }
        }
        processed += 1;
    }

    tracing::debug!(worker = id, processed, "worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocked::BlockGrid;
    use crate::matrix::SquareMatrix;
    use crate::threaded::job::Operands;
    use parking_lot::Mutex;

    #[test]
    fn test_rejects_empty_pool() {
        assert!(matches!(
            WorkerPool::<f64>::new(0),
            Err(MultiplyError::NoWorkers)
        ));
    }

    #[test]
    fn test_shutdown_joins_idle_workers() {
        let mut pool = WorkerPool::<i32>::new(5).unwrap();
        assert_eq!(pool.worker_count(), 5);

        assert_eq!(pool.shutdown(), 5);
        assert_eq!(pool.shutdown(), 0);
        assert_eq!(pool.worker_count(), 0);
        assert!(pool.queue().is_closed());
    }

    #[test]
    fn test_workers_drain_queue() {
        let size = 6;
        let a = SquareMatrix::from_fn(size, |x, y| (x + y) as i64);
        let b = SquareMatrix::from_fn(size, |x, _| x as i64);
        let mut c = SquareMatrix::new(size);

        let pool = WorkerPool::<i64>::new(3).unwrap();
        let grid = BlockGrid::new(size, 3).unwrap();
        let operands = Operands {
            a: &a,
            b: &b,
            c: Mutex::new(&mut c),
        };

        let id = pool.queue().register_computation(grid.job_count());
        pool.queue().enqueue_all(
            grid.blocks()
                .map(|block| unsafe { BlockJob::new(id, block, grid.block_size(), &operands) }),
        );
        let completion = pool.queue().await_completion(id);

        assert_eq!(completion.total_jobs, 27);
        assert_eq!(completion.failed_jobs, 0);
        assert_eq!(pool.queue().stats().jobs_completed, 27);
    }

    #[test]
    fn test_panicking_job_is_reported_and_worker_survives() {
        // Out-of-range block: partial product indexes past the matrix and panics
        let a = SquareMatrix::<i32>::new(2);
        let mut c = SquareMatrix::<i32>::new(2);
        let operands = Operands {
            a: &a,
            b: &a,
            c: Mutex::new(&mut c),
        };

        let pool = WorkerPool::<i32>::new(1).unwrap();
        let queue = pool.queue();

        let id = queue.register_computation(2);
        let bad = crate::blocked::BlockCoord { i: 5, j: 5, k: 5 };
        let good = crate::blocked::BlockCoord { i: 0, j: 0, k: 0 };
        queue.enqueue(unsafe { BlockJob::new(id, bad, 2, &operands) });
        queue.enqueue(unsafe { BlockJob::new(id, good, 2, &operands) });

        let completion = queue.await_completion(id);
        assert_eq!(completion.total_jobs, 2);
        assert_eq!(completion.failed_jobs, 1);
    }
}
