use super::{Element, SquareMatrix};
use crate::Multiplier;
use crate::error::Result;

/// Textbook triple-loop multiplier.
///
/// Single-threaded and cache-unfriendly (A is walked down a column in the
/// inner loop). Use it as a correctness and timing baseline for
/// [`ThreadedMultiplier`](crate::ThreadedMultiplier), not for speed.
///
/// ```
/// use blockmul::{Multiplier, SequentialMultiplier, SquareMatrix};
///
/// let a = SquareMatrix::from_fn(2, |x, y| [[1, 2], [3, 4]][y][x]);
/// let b = SquareMatrix::from_fn(2, |x, y| [[5, 6], [7, 8]][y][x]);
/// let mut c = SquareMatrix::new(2);
///
/// SequentialMultiplier.multiply(&a, &b, &mut c).unwrap();
/// assert_eq!(c.as_slice(), &[19, 22, 43, 50]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialMultiplier;

impl<T: Element> Multiplier<T> for SequentialMultiplier {
    /// Overwrites C with A × B.
    fn multiply(
        &self,
        a: &SquareMatrix<T>,
        b: &SquareMatrix<T>,
        c: &mut SquareMatrix<T>,
    ) -> Result<()> {
        crate::check_sizes(a, b, c)?;
        let n = a.size();

        for x in 0..n {
            for y in 0..n {
                let mut sum = T::zero();
                for k in 0..n {
                    sum = sum + a.element(k, y) * b.element(x, k);
                }
                c.set_element(x, y, sum);
            }
        }
        Ok(())
    }
}
