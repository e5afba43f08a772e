//! Per-block partial product and accumulation.
//!
//! The partial product only reads A and B, so it runs without a lock into a
//! private buffer. [`accumulate_block`] is the short pass that adds the buffer
//! into C and is the only part that needs exclusion.

use super::BlockCoord;
use crate::matrix::{Element, SquareMatrix};

/// Contribution of reduction block `k` to output block `(i, j)`.
///
/// Returns a `block_size`×`block_size` buffer, row-major, local to the block.
/// Uses i-k-j order: the inner loop walks a row of B and a row of the buffer
/// sequentially instead of striding down a column.
pub fn block_partial_product<T: Element>(
    a: &SquareMatrix<T>,
    b: &SquareMatrix<T>,
    block: BlockCoord,
    block_size: usize,
) -> Vec<T> {
    let x0 = block.i * block_size;
    let y0 = block.j * block_size;
    let k0 = block.k * block_size;

    let mut partial = vec![T::zero(); block_size * block_size];

    for (dy, out_row) in partial.chunks_exact_mut(block_size.max(1)).enumerate() {
        let a_row = &a.row(y0 + dy)[k0..k0 + block_size];
        for (dk, &a_val) in a_row.iter().enumerate() {
            let b_row = &b.row(k0 + dk)[x0..x0 + block_size];
            for (acc, &b_val) in out_row.iter_mut().zip(b_row) {
                *acc = *acc + a_val * b_val;
            }
        }
    }

    partial
}

/// Adds a buffer from [`block_partial_product`] into output block `(i, j)`.
pub fn accumulate_block<T: Element>(
    c: &mut SquareMatrix<T>,
    partial: &[T],
    block: BlockCoord,
    block_size: usize,
) {
    debug_assert_eq!(partial.len(), block_size * block_size);

    let x0 = block.i * block_size;
    let y0 = block.j * block_size;

    for (dy, src) in partial.chunks_exact(block_size.max(1)).enumerate() {
        let dst = &mut c.row_mut(y0 + dy)[x0..x0 + block_size];
        for (cell, &v) in dst.iter_mut().zip(src) {
            *cell = *cell + v;
        }
    }
}
