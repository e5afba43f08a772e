//! Criterion benchmarks for the block-parallel multiplier.

use blockmul::{Multiplier, SequentialMultiplier, SquareMatrix, ThreadedMultiplier};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

fn pattern_matrix(size: usize) -> SquareMatrix<f64> {
    SquareMatrix::from_fn(size, |x, y| ((x * 17 + y * 13) % 100) as f64)
}

fn bench_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential");

    for size in [64, 128, 256] {
        let a = pattern_matrix(size);
        let b = pattern_matrix(size);
        group.throughput(Throughput::Elements((size * size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bench, &size| {
            let mut c = SquareMatrix::new(size);
            bench.iter(|| {
                SequentialMultiplier
                    .multiply(black_box(&a), black_box(&b), &mut c)
                    .unwrap();
            });
        });
    }

    group.finish();
}

fn bench_block_count(c: &mut Criterion) {
    let size = 240;
    let a = pattern_matrix(size);
    let b = pattern_matrix(size);
    let multiplier = ThreadedMultiplier::<f64>::with_workers(4).unwrap();

    let mut group = c.benchmark_group("threaded_blocks_per_row");
    group.throughput(Throughput::Elements((size * size * size) as u64));

    for blocks_per_row in [1, 2, 4, 6, 8, 12] {
        group.bench_with_input(
            BenchmarkId::from_parameter(blocks_per_row),
            &blocks_per_row,
            |bench, &blocks_per_row| {
                let mut c = SquareMatrix::new(size);
                bench.iter(|| {
                    multiplier
                        .multiply_with_blocks(black_box(&a), black_box(&b), &mut c, blocks_per_row)
                        .unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_worker_count(c: &mut Criterion) {
    let size = 240;
    let a = pattern_matrix(size);
    let b = pattern_matrix(size);

    let mut group = c.benchmark_group("threaded_workers");

    for workers in [1, 2, 4, 8] {
        let multiplier = ThreadedMultiplier::<f64>::with_workers(workers).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |bench, _| {
            let mut c = SquareMatrix::new(size);
            bench.iter(|| {
                multiplier
                    .multiply_with_blocks(black_box(&a), black_box(&b), &mut c, 4)
                    .unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sequential, bench_block_count, bench_worker_count);
criterion_main!(benches);
