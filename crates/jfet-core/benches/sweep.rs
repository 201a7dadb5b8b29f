//! Benchmarks for the output characteristic sweep.
//!
//! Run with: cargo bench -p jfet-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jfet_core::sweep::{sweep, SweepBounds, SweepConfig};
use jfet_devices::jfet::JfetParams;

fn bench_sweep(c: &mut Criterion) {
    let params = JfetParams::n2n3819();
    let bounds = SweepBounds::default();
    let mut group = c.benchmark_group("sweep");

    for vds_step in [0.1, 0.01, 0.001] {
        let config = SweepConfig {
            vds_step,
            ..SweepConfig::default()
        };
        group.bench_with_input(BenchmarkId::new("sequential", vds_step), &config, |b, config| {
            b.iter(|| sweep(black_box(&params), config, &bounds))
        });
        #[cfg(feature = "parallel")]
        group.bench_with_input(BenchmarkId::new("parallel", vds_step), &config, |b, config| {
            b.iter(|| jfet_core::sweep::sweep_parallel(black_box(&params), config, &bounds))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sweep);
criterion_main!(benches);
