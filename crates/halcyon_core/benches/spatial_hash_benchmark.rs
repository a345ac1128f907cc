//! # Spatial Hash Benchmark
//!
//! Incremental updates and broad-phase queries on a 64-unit grid.
//!
//! Run with: `cargo bench --package halcyon_core`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use halcyon_core::{EntityId, Rect2, SpatialHashMap};

const ENTITY_COUNT: u32 = 1000;
const CELL_SIZE: f32 = 64.0;

/// Deterministic pseudo-random positions (xorshift).
fn positions(count: u32, seed: u64) -> Vec<(f32, f32)> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            ((state % 2048) as f32, ((state >> 16) % 2048) as f32)
        })
        .collect()
}

fn populated_grid() -> SpatialHashMap {
    let mut grid = SpatialHashMap::new(CELL_SIZE);
    for (i, (x, y)) in positions(ENTITY_COUNT, 0xC0FFEE).into_iter().enumerate() {
        grid.insert_or_update(EntityId::new(i as u32, 0), Rect2::new(x, y, 32.0, 32.0));
    }
    grid
}

fn bench_insert_or_update_moving(c: &mut Criterion) {
    let mut grid = populated_grid();
    let mut offset = 0.0f32;

    c.bench_function("insert_or_update_1000_moving", |b| {
        b.iter(|| {
            offset = (offset + 3.0) % 256.0;
            for i in 0..ENTITY_COUNT {
                let rect = Rect2::new(i as f32 + offset, offset, 32.0, 32.0);
                black_box(grid.insert_or_update(EntityId::new(i, 0), rect));
            }
        });
    });
}

fn bench_insert_or_update_static(c: &mut Criterion) {
    let mut grid = populated_grid();
    let rects: Vec<_> = (0..ENTITY_COUNT)
        .filter_map(|i| grid.handle(EntityId::new(i, 0)).map(|h| (i, h.rect)))
        .collect();

    c.bench_function("insert_or_update_1000_unchanged", |b| {
        b.iter(|| {
            for &(i, rect) in &rects {
                black_box(grid.insert_or_update(EntityId::new(i, 0), rect));
            }
        });
    });
}

fn bench_compute_collisions(c: &mut Criterion) {
    let grid = populated_grid();

    c.bench_function("compute_collisions_1000", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for i in 0..ENTITY_COUNT {
                total += grid.compute_collisions(EntityId::new(i, 0)).len();
            }
            black_box(total)
        });
    });
}

criterion_group!(
    benches,
    bench_insert_or_update_moving,
    bench_insert_or_update_static,
    bench_compute_collisions,
);
criterion_main!(benches);
