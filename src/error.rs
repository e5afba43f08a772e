//! Error types for block-parallel multiplication.

use thiserror::Error;

/// Errors returned when a multiplier or a multiply call is rejected.
#[derive(Debug, Error)]
pub enum MultiplyError {
    /// A pool needs at least one worker thread.
    #[error("worker thread count must be at least 1")]
    NoWorkers,

    /// Block count per row was zero.
    #[error("blocks per row must be at least 1")]
    ZeroBlocksPerRow,

    /// Block count does not split the matrix into equal blocks.
    #[error("{blocks_per_row} blocks per row does not divide matrix size {size}")]
    IndivisibleBlocks { size: usize, blocks_per_row: usize },

    /// `blocks_per_row³` jobs would not fit in a `usize`.
    #[error("{blocks_per_row} blocks per row gives more jobs than can be counted")]
    TooManyBlocks { blocks_per_row: usize },

    /// Operands of different sizes.
    #[error("matrix size mismatch: A is {a}x{a}, B is {b}x{b}, C is {c}x{c}")]
    SizeMismatch { a: usize, b: usize, c: usize },

    /// Some block jobs panicked; C holds a partial result.
    #[error("{failed} of {total} block jobs panicked")]
    JobsPanicked { failed: usize, total: usize },

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// Configuration value could not be used.
    #[error("invalid value {value:?} for {key}")]
    InvalidConfig { key: &'static str, value: String },
}

/// Result type for multiplier operations.
pub type Result<T> = std::result::Result<T, MultiplyError>;
