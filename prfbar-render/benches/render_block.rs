use std::f64::consts::PI;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use prfbar_core::{ExperimentParams, Resolution, ResolvedParams, resolve};
use prfbar_render::{CheckerboardRenderer, RenderOpts};

fn harness() -> ResolvedParams {
    resolve(ExperimentParams {
        resolution: Resolution {
            width: 640,
            height: 480,
        },
        ..Default::default()
    })
    .expect("bench params")
}

pub fn bench_block_geometry(c: &mut Criterion) {
    let resolved = harness();
    let renderer = CheckerboardRenderer::new(&resolved);
    let mut g = c.benchmark_group("render_block");
    g.sample_size(20);

    g.bench_function("geometry", |b| {
        b.iter(|| black_box(renderer.block_geometry(1, 5.0 * PI / 4.0)))
    });

    let geometry = renderer.block_geometry(1, 5.0 * PI / 4.0);
    g.bench_function("step", |b| {
        b.iter(|| black_box(geometry.render_step(renderer.grid(), 10, 128)))
    });

    g.finish();
}

pub fn bench_library(c: &mut Criterion) {
    let mut g = c.benchmark_group("render_library");
    g.sample_size(10);

    g.bench_function("single_thread", |b| {
        b.iter_batched(
            harness,
            |resolved| {
                let renderer = CheckerboardRenderer::new(&resolved);
                black_box(renderer.render_library(&RenderOpts { threads: Some(1) }))
                    .map(|(lib, _)| lib.len())
            },
            BatchSize::LargeInput,
        )
    });

    g.finish();
}

criterion_group!(benches, bench_block_geometry, bench_library);
criterion_main!(benches);
