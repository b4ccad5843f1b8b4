//! Benchmarks for splitting inputs into merge jobs and naming their outputs

use ahadd::reduce::{chunk_output_path, rounds_needed, Partitioner};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;
use std::path::{Path, PathBuf};

fn input_paths(n: usize) -> Vec<PathBuf> {
    (0..n)
        .map(|i| PathBuf::from(format!("/data/run/input_{:06}.root", i)))
        .collect()
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");
    let round_dir = Path::new("/tmp/ahadd_bench/0_abcdef");

    for &n in &[100usize, 1_000, 10_000] {
        let inputs = input_paths(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &inputs, |b, inputs| {
            let mut partitioner = Partitioner::new(20, "root", StdRng::seed_from_u64(1));
            b.iter(|| black_box(partitioner.partition(round_dir, black_box(inputs))));
        });
    }

    group.finish();
}

fn bench_output_naming(c: &mut Criterion) {
    let round_dir = Path::new("/tmp/ahadd_bench/0_abcdef");
    let mut rng = StdRng::seed_from_u64(7);
    let mut counter = 0u64;

    c.bench_function("chunk_output_path", |b| {
        b.iter(|| {
            counter += 1;
            black_box(chunk_output_path(round_dir, counter, "root", &mut rng))
        })
    });
}

fn bench_rounds_needed(c: &mut Criterion) {
    c.bench_function("rounds_needed", |b| {
        b.iter(|| black_box(rounds_needed(black_box(1_000_000), black_box(20))))
    });
}

criterion_group!(benches, bench_partition, bench_output_naming, bench_rounds_needed);
criterion_main!(benches);
