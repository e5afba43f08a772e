//! Job queue and completion monitor shared by the worker pool and callers.
//!
//! One mutex guards all state. Two condition variables hang off it:
//! `job_available` for idle workers and `computation_done` for callers.
//! `computation_done` is shared by every active computation, so each waiter
//! loops on its own id's counter and goes back to sleep on wakeups meant for
//! somebody else.

use parking_lot::{Condvar, Mutex};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Identifies one in-flight multiply call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComputationId(u64);

impl fmt::Display for ComputationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of a finished computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub total_jobs: usize,
    /// Jobs that panicked instead of accumulating their result.
    pub failed_jobs: usize,
}

/// Point-in-time counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    pub pending_jobs: usize,
    pub active_computations: usize,
    /// Jobs finished since the queue was created, across all computations.
    pub jobs_completed: u64,
}

#[derive(Debug)]
struct ComputationRecord {
    total_jobs: usize,
    remaining_jobs: usize,
    failed_jobs: usize,
}

struct QueueState<J> {
    jobs: VecDeque<J>,
    computations: HashMap<ComputationId, ComputationRecord>,
    next_id: u64,
    jobs_completed: u64,
    closed: bool,
}

/// FIFO of jobs plus a per-computation table of outstanding job counts.
pub struct JobQueue<J> {
    state: Mutex<QueueState<J>>,
    job_available: Condvar,
    computation_done: Condvar,
}

impl<J> JobQueue<J> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                computations: HashMap::new(),
                next_id: 0,
                jobs_completed: 0,
                closed: false,
            }),
            job_available: Condvar::new(),
            computation_done: Condvar::new(),
        }
    }

    /// Appends a job and wakes one idle worker.
    pub fn enqueue(&self, job: J) {
        let mut state = self.state.lock();
        if state.closed {
            invariant_violation("job enqueued after shutdown");
        }
        state.jobs.push_back(job);
        drop(state);
        self.job_available.notify_one();
    }

    /// Appends every job under a single lock acquisition and wakes all idle
    /// workers.
    pub fn enqueue_all<I>(&self, jobs: I)
    where
        I: IntoIterator<Item = J>,
    {
        let mut state = self.state.lock();
        if state.closed {
            invariant_violation("job enqueued after shutdown");
        }
        state.jobs.extend(jobs);
        drop(state);
        self.job_available.notify_all();
    }

    /// Next job in FIFO order, blocking while the queue is empty.
    ///
    /// Returns `None` once shutdown has been requested and the queue has
    /// drained. Jobs queued before shutdown are still handed out.
    pub fn dequeue(&self) -> Option<J> {
        let mut state = self.state.lock();
        loop {
            if let Some(job) = state.jobs.pop_front() {
                return Some(job);
            }
            if state.closed {
                return None;
            }
            self.job_available.wait(&mut state);
        }
    }

    /// Allocates an id for a computation of `total_jobs` jobs.
    ///
    /// A computation with zero jobs is already complete.
    pub fn register_computation(&self, total_jobs: usize) -> ComputationId {
        let mut state = self.state.lock();
        let id = ComputationId(state.next_id);
        state.next_id = state.next_id.wrapping_add(1);

        let record = ComputationRecord {
            total_jobs,
            remaining_jobs: total_jobs,
            failed_jobs: 0,
        };
        if state.computations.insert(id, record).is_some() {
            invariant_violation("computation id registered twice");
        }

        tracing::debug!(computation = %id, total_jobs, "computation registered");
        id
    }

    /// Records one finished job of computation `id`.
    pub fn notify_job_done(&self, id: ComputationId) {
        self.finish_job(id, false);
    }

    /// Records one job of computation `id` whose work panicked.
    ///
    /// Counts toward completion like [`notify_job_done`](Self::notify_job_done)
    /// so the caller is never left waiting on it.
    pub fn notify_job_failed(&self, id: ComputationId) {
        self.finish_job(id, true);
    }

    fn finish_job(&self, id: ComputationId, failed: bool) {
        let mut state = self.state.lock();
        state.jobs_completed += 1;

        let Some(record) = state.computations.get_mut(&id) else {
            invariant_violation("completion for unknown computation");
        };
        if record.remaining_jobs == 0 {
            invariant_violation("more completions than registered jobs");
        }
        record.remaining_jobs -= 1;
        if failed {
            record.failed_jobs += 1;
        }

        if record.remaining_jobs == 0 {
            drop(state);
            self.computation_done.notify_all();
        }
    }

    /// Blocks until every job of `id` has been reported, then releases the id.
    ///
    /// Must be called exactly once per registered computation.
    pub fn await_completion(&self, id: ComputationId) -> Completion {
        let mut state = self.state.lock();
        loop {
            let remaining = match state.computations.get(&id) {
                Some(record) => record.remaining_jobs,
                None => invariant_violation("waiting on unknown computation"),
            };
            if remaining == 0 {
                break;
            }
            self.computation_done.wait(&mut state);
        }

        let record = state
            .computations
            .remove(&id)
            .unwrap_or_else(|| invariant_violation("computation vanished while waited on"));

        tracing::debug!(
            computation = %id,
            total_jobs = record.total_jobs,
            failed_jobs = record.failed_jobs,
            "computation complete"
        );

        Completion {
            total_jobs: record.total_jobs,
            failed_jobs: record.failed_jobs,
        }
    }

    /// Closes the queue and wakes every blocked worker. Idempotent.
    pub fn request_shutdown(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        let pending = state.jobs.len();
        drop(state);

        tracing::debug!(pending, "job queue closed");
        self.job_available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock();
        QueueStats {
            pending_jobs: state.jobs.len(),
            active_computations: state.computations.len(),
            jobs_completed: state.jobs_completed,
        }
    }
}

impl<J> Default for JobQueue<J> {
    fn default() -> Self {
        Self::new()
    }
}

/// Monitor state is corrupt. Outstanding jobs may still point into a caller's
/// stack, so unwinding is not an option.
#[cold]
fn invariant_violation(what: &str) -> ! {
    tracing::error!(what, "job queue invariant violated, aborting");
    // Library callers may not have installed a subscriber
    eprintln!("blockmul: job queue invariant violated: {what}");
    std::process::abort()
}
