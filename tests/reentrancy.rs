use blockmul::{Multiplier, SequentialMultiplier, SquareMatrix, ThreadedMultiplier};
use std::sync::{Arc, Barrier};
use std::thread;

fn caller_matrices(size: usize, caller: usize) -> (SquareMatrix<i64>, SquareMatrix<i64>) {
    let a = SquareMatrix::from_fn(size, |x, y| ((x * 3 + y + caller) % 10) as i64);
    let b = SquareMatrix::from_fn(size, |x, y| ((x + y * 5 + 2 * caller) % 10) as i64);
    (a, b)
}

fn reference(a: &SquareMatrix<i64>, b: &SquareMatrix<i64>) -> SquareMatrix<i64> {
    let mut c = SquareMatrix::new(a.size());
    SequentialMultiplier.multiply(a, b, &mut c).unwrap();
    c
}

/// `callers` threads each multiply their own matrices through one shared
/// multiplier, all released at the same moment.
fn run_concurrent_callers(size: usize, workers: usize, blocks_per_row: usize, callers: usize) {
    let multiplier = Arc::new(ThreadedMultiplier::<i64>::with_workers(workers).unwrap());
    let barrier = Arc::new(Barrier::new(callers));

    let handles: Vec<_> = (0..callers)
        .map(|caller| {
            let multiplier = Arc::clone(&multiplier);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let (a, b) = caller_matrices(size, caller);
                let mut c = SquareMatrix::new(size);

                barrier.wait();
                multiplier
                    .multiply_with_blocks(&a, &b, &mut c, blocks_per_row)
                    .unwrap();

                let expected = reference(&a, &b);
                assert_eq!(
                    expected.first_mismatch(&c),
                    None,
                    "caller {} got another computation's result",
                    caller
                );
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = multiplier.stats();
    assert_eq!(stats.active_computations, 0);
    assert_eq!(stats.pending_jobs, 0);
    assert_eq!(
        stats.jobs_completed,
        (callers * blocks_per_row.pow(3)) as u64
    );
}

#[test]
fn test_reentering() {
    run_concurrent_callers(500, 4, 5, 2);
}

#[test]
fn test_high_reentrancy() {
    run_concurrent_callers(300, 4, 6, 4);
}

#[test]
fn test_extreme_reentrancy() {
    run_concurrent_callers(200, 4, 4, 8);
}

#[test]
fn test_more_callers_than_workers_with_scoped_threads() {
    let multiplier = ThreadedMultiplier::<i64>::with_workers(2).unwrap();
    let size = 30;

    thread::scope(|s| {
        for caller in 0..12 {
            let multiplier = &multiplier;
            s.spawn(move || {
                let (a, b) = caller_matrices(size, caller);
                let mut c = SquareMatrix::new(size);
                multiplier.multiply_with_blocks(&a, &b, &mut c, 3).unwrap();
                assert_eq!(c, reference(&a, &b), "caller {}", caller);
            });
        }
    });

    assert_eq!(multiplier.stats().active_computations, 0);
}

#[test]
fn test_mixed_block_counts_share_the_pool() {
    let multiplier = ThreadedMultiplier::<i64>::with_workers(3).unwrap();
    let size = 60;

    thread::scope(|s| {
        for (caller, blocks_per_row) in [1, 2, 3, 4, 5, 6, 10, 12].into_iter().enumerate() {
            let multiplier = &multiplier;
            s.spawn(move || {
                let (a, b) = caller_matrices(size, caller);
                let mut c = SquareMatrix::new(size);
                multiplier
                    .multiply_with_blocks(&a, &b, &mut c, blocks_per_row)
                    .unwrap();
                assert_eq!(c, reference(&a, &b), "blocks_per_row {}", blocks_per_row);
            });
        }
    });
}

#[test]
fn test_back_to_back_reuse_never_hangs() {
    let multiplier = ThreadedMultiplier::<i64>::with_workers(4).unwrap();
    let (a, b) = caller_matrices(4, 0);
    let expected = reference(&a, &b);
    let mut c = SquareMatrix::new(4);

    for round in 0..2_000 {
        let blocks_per_row = [1, 2, 4][round % 3];
        multiplier
            .multiply_with_blocks(&a, &b, &mut c, blocks_per_row)
            .unwrap();
        assert_eq!(c, expected, "round {}", round);
    }

    let stats = multiplier.stats();
    assert_eq!(stats.active_computations, 0);
    assert_eq!(stats.pending_jobs, 0);
}

#[test]
fn test_concurrent_back_to_back_reuse() {
    let multiplier = ThreadedMultiplier::<i64>::with_workers(4).unwrap();

    thread::scope(|s| {
        for caller in 0..6 {
            let multiplier = &multiplier;
            s.spawn(move || {
                let (a, b) = caller_matrices(6, caller);
                let expected = reference(&a, &b);
                let mut c = SquareMatrix::new(6);
                for _ in 0..300 {
                    multiplier.multiply_with_blocks(&a, &b, &mut c, 2).unwrap();
                    assert_eq!(c, expected, "caller {}", caller);
                }
            });
        }
    });

    assert_eq!(multiplier.stats().jobs_completed, 6 * 300 * 8);
}
