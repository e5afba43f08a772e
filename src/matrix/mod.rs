//! Dense square matrix storage and the sequential reference multiplier.
//!
//! The container is deliberately passive: no internal locking. Anything that
//! writes to it from several threads has to provide its own exclusion.

pub mod sequential;

use num_traits::Zero;
use std::fmt::Debug;
use std::ops::Mul;

/// Numeric types the multipliers operate on.
///
/// `Zero` supplies the additive identity and `Add`. Overflow behaviour is
/// whatever the type itself does.
pub trait Element: Copy + Zero + Mul<Output = Self> + Send + Sync + Debug + 'static {}

impl<T> Element for T where T: Copy + Zero + Mul<Output = T> + Send + Sync + Debug + 'static {}

/// A dense `size`×`size` matrix.
///
/// Coordinates are `(x, y)` with `x` the column and `y` the row; storage is
/// row-major, so `element(x, y)` reads `data[size * y + x]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix<T> {
    data: Vec<T>,
    size: usize,
}

impl<T: Element> SquareMatrix<T> {
    /// Zero-filled matrix.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![T::zero(); size * size],
            size,
        }
    }

    /// Builds a matrix from `f(x, y)`.
    ///
    /// ```
    /// use blockmul::SquareMatrix;
    ///
    /// let m = SquareMatrix::from_fn(2, |x, y| (10 * y + x) as i32);
    /// assert_eq!(m.element(1, 0), 1);
    /// assert_eq!(m.element(0, 1), 10);
    /// ```
    pub fn from_fn<F>(size: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut data = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                data.push(f(x, y));
            }
        }
        Self { data, size }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// First coordinate where `self` and `other` differ, scanning column by
    /// column. `None` when they are equal.
    ///
    /// # Panics
    ///
    /// Panics if the sizes differ.
    pub fn first_mismatch(&self, other: &Self) -> Option<(usize, usize)>
    where
        T: PartialEq,
    {
        assert_eq!(self.size, other.size, "comparing matrices of different size");
        (0..self.size)
            .flat_map(|x| (0..self.size).map(move |y| (x, y)))
            .find(|&(x, y)| self.element(x, y) != other.element(x, y))
    }
}

impl<T: Copy> SquareMatrix<T> {
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn element(&self, x: usize, y: usize) -> T {
        self.data[self.size * y + x]
    }

    #[inline]
    pub fn set_element(&mut self, x: usize, y: usize, value: T) {
        self.data[self.size * y + x] = value;
    }

    /// Row `y` as a slice indexed by `x`.
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        &self.data[self.size * y..self.size * (y + 1)]
    }

    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        &mut self.data[self.size * y..self.size * (y + 1)]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}
