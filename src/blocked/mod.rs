//! Block decomposition of a square product.
//!
//! An `N`×`N` product split into `blocks_per_row` blocks per side becomes a
//! `blocks_per_row³` grid of jobs. Job `(i, j, k)` adds reduction block `k`'s
//! contribution to output block `(i, j)`:
//!
//! ```text
//! C(x, y) += Σ_{kk in block k} A(kk, y) · B(x, kk)    for x in block i, y in block j
//! ```
//!
//! Distinct `(i, j)` blocks never overlap. All `k` for one `(i, j)` write the
//! same cells, which is why accumulation goes through a lock.

pub mod partial;

use crate::error::{MultiplyError, Result};

/// Position of one job in the block grid.
///
/// `i` indexes the block along `x` (columns of C), `j` along `y` (rows of C)
/// and `k` along the reduction dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockCoord {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

/// A validated split of an `N`×`N` product into equal square blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    size: usize,
    blocks_per_row: usize,
    block_size: usize,
    job_count: usize,
}

impl BlockGrid {
    /// Rejects `blocks_per_row == 0`, counts that don't divide `size`, and
    /// counts whose cube overflows. Only an empty matrix can reach the last
    /// case, since every count that divides a non-empty size is at most that
    /// size.
    pub fn new(size: usize, blocks_per_row: usize) -> Result<Self> {
        if blocks_per_row == 0 {
            return Err(MultiplyError::ZeroBlocksPerRow);
        }
        if size % blocks_per_row != 0 {
            return Err(MultiplyError::IndivisibleBlocks {
                size,
                blocks_per_row,
            });
        }
        let job_count = blocks_per_row
            .checked_pow(3)
            .ok_or(MultiplyError::TooManyBlocks { blocks_per_row })?;
        Ok(Self {
            size,
            blocks_per_row,
            block_size: size / blocks_per_row,
            job_count,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn blocks_per_row(&self) -> usize {
        self.blocks_per_row
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// One job per `(i, j, k)` triple.
    pub fn job_count(&self) -> usize {
        self.job_count
    }

    /// Every block of the grid, `k` varying fastest.
    pub fn blocks(&self) -> impl Iterator<Item = BlockCoord> + use<> {
        let n = self.blocks_per_row;
        (0..n).flat_map(move |i| {
            (0..n).flat_map(move |j| (0..n).map(move |k| BlockCoord { i, j, k }))
        })
    }
}
