//! Property-based tests using proptest
//!
//! - Threaded product equals the sequential reference for any divisor
//! - Result does not depend on block count or worker count
//! - Stale output contents never leak into the result

use blockmul::{Multiplier, SequentialMultiplier, SquareMatrix, ThreadedMultiplier};
use proptest::prelude::*;

/// A size, a divisor of it, and two matrices of small values.
fn product_case() -> impl Strategy<Value = (usize, usize, Vec<i64>, Vec<i64>)> {
    (1usize..=24)
        .prop_flat_map(|size| {
            let divisors: Vec<usize> = (1..=size).filter(|d| size % d == 0).collect();
            (
                Just(size),
                prop::sample::select(divisors),
                prop::collection::vec(-50i64..50, size * size),
                prop::collection::vec(-50i64..50, size * size),
            )
        })
}

fn from_values(size: usize, values: &[i64]) -> SquareMatrix<i64> {
    SquareMatrix::from_fn(size, |x, y| values[y * size + x])
}

fn reference(a: &SquareMatrix<i64>, b: &SquareMatrix<i64>) -> SquareMatrix<i64> {
    let mut c = SquareMatrix::new(a.size());
    SequentialMultiplier.multiply(a, b, &mut c).unwrap();
    c
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_threaded_matches_reference(
        (size, blocks_per_row, a, b) in product_case(),
        workers in 1usize..=6,
    ) {
        let a = from_values(size, &a);
        let b = from_values(size, &b);
        let multiplier = ThreadedMultiplier::<i64>::with_workers(workers).unwrap();

        let mut c = SquareMatrix::new(size);
        multiplier.multiply_with_blocks(&a, &b, &mut c, blocks_per_row).unwrap();

        prop_assert_eq!(c, reference(&a, &b));
    }

    #[test]
    fn prop_block_count_independent(
        (size, blocks_per_row, a, b) in product_case(),
    ) {
        let a = from_values(size, &a);
        let b = from_values(size, &b);
        let multiplier = ThreadedMultiplier::<i64>::with_workers(3).unwrap();

        let mut coarse = SquareMatrix::new(size);
        let mut fine = SquareMatrix::new(size);
        multiplier.multiply_with_blocks(&a, &b, &mut coarse, 1).unwrap();
        multiplier.multiply_with_blocks(&a, &b, &mut fine, blocks_per_row).unwrap();

        prop_assert_eq!(coarse, fine);
    }

    #[test]
    fn prop_stale_output_is_ignored(
        (size, blocks_per_row, a, b) in product_case(),
        stale in -1000i64..1000,
    ) {
        let a = from_values(size, &a);
        let b = from_values(size, &b);
        let multiplier = ThreadedMultiplier::<i64>::with_workers(2).unwrap();

        let mut c = SquareMatrix::from_fn(size, |_, _| stale);
        multiplier.multiply_with_blocks(&a, &b, &mut c, blocks_per_row).unwrap();

        prop_assert_eq!(c, reference(&a, &b));
    }
}
