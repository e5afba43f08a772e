//! Multi-threaded block multiplication.
//!
//! - `queue`: job FIFO and per-computation completion monitor
//! - `job`: one `(i, j, k)` block job
//! - `pool`: persistent worker threads
//! - `multiplier`: decomposes a product into jobs and waits for them

mod job;
pub mod multiplier;
mod pool;
pub mod queue;
