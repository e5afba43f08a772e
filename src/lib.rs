//! Reentrant block-parallel multiplication of dense square matrices.
//!
//! A [`ThreadedMultiplier`] owns a fixed pool of worker threads. Each call to
//! [`multiply_with_blocks`](ThreadedMultiplier::multiply_with_blocks) splits
//! the product into `blocks_per_row³` block jobs, pushes them onto the shared
//! queue and sleeps until its own jobs are done. Several threads can multiply
//! through the same instance at once without seeing each other's results.
//!
//! ## Usage
//!
//! ```
//! use blockmul::{Multiplier, SequentialMultiplier, SquareMatrix, ThreadedMultiplier};
//!
//! let a = SquareMatrix::from_fn(12, |x, y| ((x + y) % 10) as i64);
//! let b = SquareMatrix::from_fn(12, |x, y| ((x * y) % 10) as i64);
//!
//! let mut expected = SquareMatrix::new(12);
//! SequentialMultiplier.multiply(&a, &b, &mut expected).unwrap();
//!
//! let multiplier = ThreadedMultiplier::with_workers(4).unwrap();
//! let mut c = SquareMatrix::new(12);
//! multiplier.multiply_with_blocks(&a, &b, &mut c, 3).unwrap();
//!
//! assert_eq!(c, expected);
//! ```
//!
//! Sharing one multiplier between caller threads:
//!
//! ```
//! use blockmul::{SquareMatrix, ThreadedMultiplier};
//!
//! let multiplier = ThreadedMultiplier::<f64>::with_workers(4).unwrap();
//!
//! std::thread::scope(|s| {
//!     for seed in 0..3 {
//!         let multiplier = &multiplier;
//!         s.spawn(move || {
//!             let a = SquareMatrix::from_fn(8, |x, y| (x + y + seed) as f64);
//!             let mut c = SquareMatrix::new(8);
//!             multiplier.multiply_with_blocks(&a, &a, &mut c, 2).unwrap();
//!         });
//!     }
//! });
//! ```
//!
//! ## What's inside
//!
//! - `matrix`: the passive container and the sequential reference multiplier
//! - `blocked`: block grid and the per-block kernel
//! - `threaded`: job queue/monitor, worker pool, orchestration

pub mod blocked;
pub mod config;
pub mod error;
pub mod matrix;
pub mod threaded;

pub use config::MultiplierConfig;
pub use error::{MultiplyError, Result};
pub use matrix::sequential::SequentialMultiplier;
pub use matrix::{Element, SquareMatrix};
pub use threaded::multiplier::ThreadedMultiplier;
pub use threaded::queue::{Completion, ComputationId, JobQueue, QueueStats};

/// Something that computes `C := A × B` for square matrices.
pub trait Multiplier<T: Element> {
    fn multiply(&self, a: &SquareMatrix<T>, b: &SquareMatrix<T>, c: &mut SquareMatrix<T>)
    -> Result<()>;
}

pub(crate) fn check_sizes<T: Element>(
    a: &SquareMatrix<T>,
    b: &SquareMatrix<T>,
    c: &SquareMatrix<T>,
) -> Result<()> {
    if a.size() != b.size() || a.size() != c.size() {
        return Err(MultiplyError::SizeMismatch {
            a: a.size(),
            b: b.size(),
            c: c.size(),
        });
    }
    Ok(())
}
