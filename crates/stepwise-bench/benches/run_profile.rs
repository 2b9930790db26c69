//! Criterion benchmarks for complete controller runs.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use stepwise_bench::{reference_profile, stress_profile};

fn bench_reference_run(c: &mut Criterion) {
    c.bench_function("reference_run_10k", |b| {
        b.iter(|| {
            let dir = tempfile::tempdir().unwrap();
            let mut controller = reference_profile(dir.path()).unwrap();
            let outcome = controller.run().unwrap();
            black_box(&outcome);
        });
    });
}

fn bench_stress_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("stress");
    group.sample_size(10);
    group.bench_function("stress_run_100k", |b| {
        b.iter(|| {
            let dir = tempfile::tempdir().unwrap();
            let mut controller = stress_profile(dir.path()).unwrap();
            let outcome = controller.run().unwrap();
            black_box(&outcome);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_reference_run, bench_stress_run);
criterion_main!(benches);
