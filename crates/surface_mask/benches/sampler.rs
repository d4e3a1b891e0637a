mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use surface_mask::placement::sampler::sample;
use surface_mask::sampling::GridSampling;

const SIDES: [f32; 4] = [8.0, 16.0, 32.0, 64.0];

fn sampler_layered_benches(c: &mut Criterion) {
    let grid = GridSampling::default();
    let mut group = c.benchmark_group("sampler/layered");

    for &side in &SIDES {
        let store = common::layered_store(side);
        let area = common::layered_area(side);
        let expected = sample(&area, &store, &grid).candidates_evaluated;
        group.throughput(common::elements_throughput(expected));

        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| {
                let result = sample(black_box(&area), &store, &grid);
                black_box(result.len());
            });
        });
    }

    group.finish();
}

fn sampler_jitter_benches(c: &mut Criterion) {
    let store = common::layered_store(32.0);
    let area = common::layered_area(32.0);
    let mut group = c.benchmark_group("sampler/jitter");

    for jitter in [0.0f32, 0.5, 1.0] {
        let grid = GridSampling::default().with_jitter(jitter, 0xA11CE);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{jitter:.2}")),
            &jitter,
            |b, _| {
                b.iter(|| black_box(sample(&area, &store, &grid).len()));
            },
        );
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = sampler_layered_benches, sampler_jitter_benches
}
criterion_main!(benches);
