//! Benchmark runner: sequential reference vs. block-parallel multiplier.
//!
//! Worker count and default block count come from `BLOCKMUL_WORKERS` and
//! `BLOCKMUL_BLOCKS_PER_ROW`; log output is controlled by `RUST_LOG`.

use blockmul::{
    Multiplier, MultiplierConfig, SequentialMultiplier, SquareMatrix, ThreadedMultiplier,
};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match MultiplierConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: MultiplierConfig) -> blockmul::Result<()> {
    println!("=== Block-Parallel Matrix Multiplication Benchmark ===\n");
    println!("Workers: {}\n", config.worker_threads());

    let multiplier = Arc::new(ThreadedMultiplier::<i64>::new(config)?);
    let cases = [(100, 4), (300, 6), (400, 10), (500, 5)];
    let mut rows = Vec::new();

    for &(size, blocks_per_row) in &cases {
        let blocks_per_row = config.default_blocks_per_row().unwrap_or(blocks_per_row);
        println!("Matrix: {}×{}, {} blocks per row", size, size, blocks_per_row);
        println!("{}", "-".repeat(50));

        let a = pattern_matrix(size, 17);
        let b = pattern_matrix(size, 13);

        let mut c_ref = SquareMatrix::new(size);
        let start = Instant::now();
        SequentialMultiplier.multiply(&a, &b, &mut c_ref)?;
        let sequential_ms = start.elapsed().as_secs_f64() * 1000.0;

        let mut c = SquareMatrix::new(size);
        let start = Instant::now();
        multiplier.multiply_with_blocks(&a, &b, &mut c, blocks_per_row)?;
        let threaded_ms = start.elapsed().as_secs_f64() * 1000.0;

        report_mismatch("threaded", &c_ref, &c);

        let speedup = sequential_ms / threaded_ms;
        println!("1. {:16} {:8.2} ms", "Sequential", sequential_ms);
        println!("2. {:16} {:8.2} ms  ({:.1}×)", "Threaded", threaded_ms, speedup);

        let concurrent_ms = run_concurrent(&multiplier, size, blocks_per_row, 4)?;
        println!(
            "3. {:16} {:8.2} ms  (4 callers sharing the pool)",
            "Reentrant", concurrent_ms
        );
        println!();

        rows.push((size, blocks_per_row, sequential_ms, threaded_ms, concurrent_ms));
    }

    print_summary_table(&rows);
    Ok(())
}

fn pattern_matrix(size: usize, modulus: usize) -> SquareMatrix<i64> {
    SquareMatrix::from_fn(size, |x, y| ((x * 31 + y * 7) % modulus) as i64)
}

/// Runs `callers` multiplies at once through the shared pool and validates
/// each against the reference. Returns wall time for the whole batch.
fn run_concurrent(
    multiplier: &Arc<ThreadedMultiplier<i64>>,
    size: usize,
    blocks_per_row: usize,
    callers: usize,
) -> blockmul::Result<f64> {
    let start = Instant::now();

    let handles: Vec<_> = (0..callers)
        .map(|caller| {
            let multiplier = Arc::clone(multiplier);
            thread::spawn(move || -> blockmul::Result<()> {
                let a = pattern_matrix(size, 11 + caller);
                let b = pattern_matrix(size, 5 + caller);

                let mut c = SquareMatrix::new(size);
                multiplier.multiply_with_blocks(&a, &b, &mut c, blocks_per_row)?;

                let mut c_ref = SquareMatrix::new(size);
                SequentialMultiplier.multiply(&a, &b, &mut c_ref)?;
                report_mismatch(&format!("caller {caller}"), &c_ref, &c);
                Ok(())
            })
        })
        .collect();

    for handle in handles {
        match handle.join() {
            Ok(result) => result?,
            Err(_) => eprintln!("caller thread panicked"),
        }
    }

    Ok(start.elapsed().as_secs_f64() * 1000.0)
}

fn report_mismatch(label: &str, expected: &SquareMatrix<i64>, actual: &SquareMatrix<i64>) {
    if let Some((x, y)) = expected.first_mismatch(actual) {
        println!(
            "   {}: mismatch at ({}, {}): expected {}, got {}",
            label,
            x,
            y,
            expected.element(x, y),
            actual.element(x, y)
        );
    }
}

fn print_summary_table(rows: &[(usize, usize, f64, f64, f64)]) {
    println!("\n{}", "=".repeat(78));
    println!("SUMMARY");
    println!("{}", "=".repeat(78));

    println!(
        "\n{:<10} {:>8} {:>14} {:>14} {:>14} {:>10}",
        "Size", "Blocks", "Sequential", "Threaded", "4× Reentrant", "Gain"
    );
    println!("{}", "-".repeat(78));

    for &(size, blocks, sequential_ms, threaded_ms, concurrent_ms) in rows {
        let gain = sequential_ms / threaded_ms * 100.0 - 100.0;
        println!(
            "{:<10} {:>8} {:>11.2} ms {:>11.2} ms {:>11.2} ms {:>9.0}%",
            size, blocks, sequential_ms, threaded_ms, concurrent_ms, gain
        );
    }

    println!("{}", "=".repeat(78));
    println!("\nGain = time saved by the threaded multiplier relative to sequential.\n");
}
