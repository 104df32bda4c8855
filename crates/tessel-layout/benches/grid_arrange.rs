//! Benchmarks for grid building, arranging and resizing.
//!
//! Run with: cargo bench -p tessel-layout --bench grid_arrange

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tessel_core::Size;
use tessel_layout::{Grid, GridConfig, ResizePolicy};
use tessel_objects::GameObject;
use tessel_render::{Raster, Rgba};

fn grid(side: usize, policy: ResizePolicy) -> Grid<GameObject> {
    let config = GridConfig { resize_policy: policy };
    Grid::build(side, side, Size::new(16, 16), config, |_| {
        Ok(GameObject::from_raster(Raster::filled(8, 8, Rgba::RED)))
    })
    .expect("bench grid")
}

fn bench_arrange(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid/arrange");
    for side in [4usize, 16, 64] {
        let mut g = grid(side, ResizePolicy::Keep);
        group.throughput(Throughput::Elements((side * side) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| {
                g.move_by(1, 1).expect("move");
                black_box(g.rect())
            })
        });
    }
    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid/resize");
    for policy in [ResizePolicy::Fit, ResizePolicy::Stretch] {
        let mut g = grid(16, policy);
        let mut grow = false;
        group.bench_with_input(BenchmarkId::new("16x16", format!("{policy:?}")), &policy, |b, _| {
            b.iter(|| {
                grow = !grow;
                let side = if grow { 320 } else { 256 };
                g.resize(side, side).expect("resize");
                black_box(g.slot_size())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_arrange, bench_resize);
criterion_main!(benches);
