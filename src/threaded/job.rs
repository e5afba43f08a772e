//! Block job descriptor.

use super::queue::ComputationId;
use crate::blocked::BlockCoord;
use crate::blocked::partial::{accumulate_block, block_partial_product};
use crate::matrix::{Element, SquareMatrix};
use parking_lot::Mutex;
use std::ptr::NonNull;

/// Borrowed operands of one multiply call, living on the caller's stack.
///
/// A and B are only read. C sits behind the call's accumulation lock.
pub(crate) struct Operands<'env, T> {
    pub a: &'env SquareMatrix<T>,
    pub b: &'env SquareMatrix<T>,
    pub c: Mutex<&'env mut SquareMatrix<T>>,
}

/// One `(i, j, k)` unit of work for a given computation.
///
/// Holds a lifetime-erased pointer to the caller's [`Operands`]. The caller
/// blocks in `await_completion` until every job it created has been reported
/// done, and workers report a job only after its last access to the operands,
/// so the pointer never outlives the borrow it was made from.
pub(crate) struct BlockJob<T: Element> {
    computation: ComputationId,
    block: BlockCoord,
    block_size: usize,
    operands: NonNull<Operands<'static, T>>,
}

// SAFETY: the pointee is only reached through `&`. A and B are shared reads
// (`T: Sync`) and C is written under its mutex (`T: Send`).
unsafe impl<T: Element> Send for BlockJob<T> {}

impl<T: Element> BlockJob<T> {
    /// # Safety
    ///
    /// `operands` must stay alive and unmoved until this job has been reported
    /// to the queue's completion monitor.
    pub(crate) unsafe fn new(
        computation: ComputationId,
        block: BlockCoord,
        block_size: usize,
        operands: &Operands<'_, T>,
    ) -> Self {
        Self {
            computation,
            block,
            block_size,
            operands: NonNull::from(operands).cast(),
        }
    }

    pub(crate) fn computation(&self) -> ComputationId {
        self.computation
    }

    pub(crate) fn block(&self) -> BlockCoord {
        self.block
    }

    /// Computes the partial product outside the lock, then adds it into C.
    pub(crate) fn run(&self) {
        // SAFETY: see `new`; the job has not been reported yet.
        let operands = unsafe { self.operands.as_ref() };

        let partial = block_partial_product(operands.a, operands.b, self.block, self.block_size);

        let mut c = operands.c.lock();
        accumulate_block(&mut c, &partial, self.block, self.block_size);
    }
}
