//! Integration tests for the frame pipeline: membership, collision, drawing
//! order and deferred deletion.

#![allow(missing_docs)]

use halcyon::components::{Collider2D, Sprite};
use halcyon::halcyon_core::{EntityId, Rect2, Size2D, Transform2D, Vec2};
use halcyon::halcyon_rendering::{RecordingBackend, TextureHandle};
use halcyon::{collision, systems, Engine, EngineConfig, EngineEvent};

const FRAME: f32 = 1.0 / 60.0;

fn engine() -> Engine {
    Engine::new(EngineConfig::default()).unwrap()
}

fn spawn_at(engine: &mut Engine, x: f32, y: f32) -> EntityId {
    let ctx = engine.context_mut();
    let entity = ctx.spawn(None).unwrap();
    let ty = ctx.types.transform;
    ctx.world
        .set_component(entity, ty, Transform2D::new(Vec2::new(x, y)))
        .unwrap();
    entity
}

fn add_collider(engine: &mut Engine, entity: EntityId, w: f32, h: f32) {
    let ctx = engine.context_mut();
    let ty = ctx.types.collider;
    ctx.world
        .set_component(entity, ty, Collider2D::new(Size2D::new(w, h)))
        .unwrap();
}

fn members(engine: &Engine, system: &str) -> Vec<EntityId> {
    engine.scheduler().system_entities(system).unwrap().to_vec()
}

#[test]
fn test_membership_follows_signature() {
    let mut engine = engine();
    let entity = spawn_at(&mut engine, 0.0, 0.0);
    engine.sync();
    assert!(members(&engine, systems::COLLISION).is_empty());

    add_collider(&mut engine, entity, 8.0, 8.0);
    engine.sync();
    assert_eq!(members(&engine, systems::COLLISION), vec![entity]);
    assert!(members(&engine, systems::SPRITE_RENDERING).is_empty());
    assert!(engine.context().spatial.contains(entity));

    let ctx = engine.context_mut();
    let ty = ctx.types.transform;
    ctx.world.remove_component(entity, ty);
    engine.sync();
    assert!(members(&engine, systems::COLLISION).is_empty());
    assert!(!engine.context().spatial.contains(entity));
}

#[test]
fn test_move_then_collide() {
    let mut engine = engine();
    let mut backend = RecordingBackend::new();

    let mover = spawn_at(&mut engine, 0.0, 0.0);
    add_collider(&mut engine, mover, 10.0, 10.0);
    let near = spawn_at(&mut engine, 100.0, 105.0);
    add_collider(&mut engine, near, 10.0, 10.0);
    let far = spawn_at(&mut engine, 500.0, 500.0);
    add_collider(&mut engine, far, 10.0, 10.0);
    engine.tick(FRAME, &mut backend);

    assert!(collision::process_entity_collisions(&engine.context().spatial, mover).is_empty());

    engine
        .context_mut()
        .transform_mut(mover)
        .unwrap()
        .set_position(Vec2::new(100.0, 100.0));
    let events = engine.context_mut().events.subscribe();
    engine.tick(FRAME, &mut backend);

    let hits = collision::process_entity_collisions(&engine.context().spatial, mover);
    assert_eq!(hits, vec![near]);
    assert!(!hits.contains(&far));
    assert_eq!(
        events.drain(),
        vec![EngineEvent::CollisionDetected {
            entity: mover,
            other: near
        }]
    );
}

#[test]
fn test_sprites_drawn_in_z_order() {
    let mut engine = engine();
    let mut backend = RecordingBackend::new();

    for z in [5, 1, 3] {
        let entity = spawn_at(&mut engine, 0.0, 0.0);
        let ctx = engine.context_mut();
        let types = ctx.types;
        ctx.transform_mut(entity).unwrap().set_z_index(z);
        ctx.world
            .set_component(
                entity,
                types.sprite,
                Sprite::new(TextureHandle(7), Rect2::new(0.0, 0.0, 16.0, 16.0)),
            )
            .unwrap();
    }

    let stats = engine.tick(FRAME, &mut backend);
    assert_eq!(stats.draw_calls, 3);
    assert_eq!(backend.z_order(), vec![1, 3, 5]);
}

#[test]
fn test_queued_entity_stays_until_end_of_frame() {
    let mut engine = engine();
    let mut backend = RecordingBackend::new();
    let entity = spawn_at(&mut engine, 0.0, 0.0);
    add_collider(&mut engine, entity, 4.0, 4.0);
    engine.tick(FRAME, &mut backend);

    let events = engine.context_mut().events.subscribe();
    assert!(engine.context_mut().queue_entity_for_deletion(entity));
    assert!(!engine.context_mut().queue_entity_for_deletion(entity));

    let ctx = engine.context();
    assert!(ctx.world.is_alive(entity));
    assert!(ctx.world.get_component(entity, ctx.types.collider).is_some());

    let stats = engine.tick(FRAME, &mut backend);
    assert_eq!(stats.deleted, 1);
    assert!(!engine.context().world.is_alive(entity));
    assert!(!engine.context().spatial.contains(entity));
    assert!(members(&engine, systems::COLLISION).is_empty());
    assert_eq!(events.drain(), vec![EngineEvent::EntityDeleted { entity }]);
}

#[test]
fn test_colliders_drawn_when_visible() {
    let config = EngineConfig {
        colliders_visible: true,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(config).unwrap();
    let mut backend = RecordingBackend::new();
    let entity = spawn_at(&mut engine, 10.0, 20.0);
    add_collider(&mut engine, entity, 4.0, 6.0);

    engine.tick(FRAME, &mut backend);
    assert_eq!(backend.submissions.len(), 1);
    let submission = &backend.submissions[0];
    assert_eq!(submission.texture, TextureHandle::WHITE);
    assert_eq!(submission.instances[0].dest, [10.0, 20.0, 4.0, 6.0]);
}
