//! # ECS Benchmark
//!
//! Component access, signature propagation and phase dispatch at the
//! default entity capacity.
//!
//! Run with: `cargo bench --package halcyon_core`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use halcyon_core::{
    Phase, Scheduler, Signature, SystemTemplate, Transform2D, TransformCache, SceneTree, Vec2,
    World, WorldConfig,
};

const ENTITY_COUNT: usize = 1000;

fn populated_world(count: usize) -> (World, halcyon_core::ComponentType<Transform2D>) {
    let mut world = World::new(WorldConfig {
        max_entities: count,
        ..WorldConfig::default()
    });
    let transforms = world.register_component_type::<Transform2D>().unwrap();
    for i in 0..count {
        let entity = world.create_entity().unwrap();
        world
            .set_component(entity, transforms, Transform2D::new(Vec2::new(i as f32, 0.0)))
            .unwrap();
    }
    (world, transforms)
}

/// Create, populate and destroy a full world.
fn bench_entity_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_churn");
    for count in [100, ENTITY_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let (mut world, _) = populated_world(count);
                let ids: Vec<_> = world.iter_alive().map(|e| e.id).collect();
                for id in ids {
                    world.destroy_entity(id);
                }
                black_box(world.alive_count())
            });
        });
    }
    group.finish();
}

/// Direct-indexed component reads.
fn bench_component_get(c: &mut Criterion) {
    let (world, transforms) = populated_world(ENTITY_COUNT);
    let ids: Vec<_> = world.iter_alive().map(|e| e.id).collect();

    c.bench_function("component_get_1000", |b| {
        b.iter(|| {
            let mut sum = 0.0f32;
            for &id in &ids {
                if let Some(t) = world.get_component(id, transforms) {
                    sum += t.position().x;
                }
            }
            black_box(sum)
        });
    });
}

/// One update phase over a system matching every entity.
fn bench_phase_dispatch(c: &mut Criterion) {
    let (mut world, transforms) = populated_world(ENTITY_COUNT);
    let mut scheduler = Scheduler::new();
    scheduler
        .register_system(
            &mut world,
            "mover",
            Signature::of(&[transforms.id()]),
            SystemTemplate::new().with_update(move |world: &mut World, entities, delta| {
                for &e in entities {
                    if let Some(t) = world.get_component_mut(e, transforms) {
                        t.translate(Vec2::new(delta, 0.0));
                    }
                }
            }),
        )
        .unwrap();

    c.bench_function("update_phase_1000", |b| {
        b.iter(|| black_box(scheduler.run_phase(&mut world, Phase::Update, 0.016)));
    });
}

/// Global transform reads on a static chain (cache hits only).
fn bench_transform_resolve_static(c: &mut Criterion) {
    let (mut world, transforms) = populated_world(64);
    let ids: Vec<_> = world.iter_alive().map(|e| e.id).collect();
    let mut scene = SceneTree::new();
    for pair in ids.windows(2) {
        scene.set_parent(pair[1], pair[0]);
    }
    let mut cache = TransformCache::new();
    let leaf = ids[ids.len() - 1];
    cache.resolve(&mut world, &scene, transforms, leaf);

    c.bench_function("transform_resolve_depth64_static", |b| {
        b.iter(|| black_box(cache.resolve(&mut world, &scene, transforms, leaf)));
    });
}

criterion_group!(
    benches,
    bench_entity_churn,
    bench_component_get,
    bench_phase_dispatch,
    bench_transform_resolve_static,
);
criterion_main!(benches);
