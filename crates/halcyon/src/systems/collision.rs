use std::collections::HashSet;

use halcyon_core::{EntityId, Rect2, System, Vec2};
use halcyon_rendering::{DrawRequest, TextureHandle};

use super::place;
use crate::collision::process_entity_collisions;
use crate::context::EngineContext;
use crate::events::EngineEvent;

/// Keeps the spatial hash in step with collider positions and reports
/// overlaps.
///
/// Every fixed update first moves all colliders, then runs the narrow phase,
/// so an overlap never depends on which entity moved first.
#[derive(Default)]
pub struct CollisionSystem {
    reported: HashSet<(EntityId, EntityId)>,
}

impl CollisionSystem {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System<EngineContext> for CollisionSystem {
    fn on_entity_registered(&mut self, ctx: &mut EngineContext, entity: EntityId) {
        ctx.refresh_collider(entity);
    }

    fn on_entity_unregistered(&mut self, ctx: &mut EngineContext, entity: EntityId) {
        ctx.spatial.remove(entity);
    }

    fn fixed_update(&mut self, ctx: &mut EngineContext, entities: &[EntityId], _delta: f32) {
        for &entity in entities {
            ctx.refresh_collider(entity);
        }

        self.reported.clear();
        for &entity in entities {
            for other in process_entity_collisions(&ctx.spatial, entity) {
                let pair = if entity < other {
                    (entity, other)
                } else {
                    (other, entity)
                };
                if self.reported.insert(pair) {
                    ctx.events
                        .publish(&EngineEvent::CollisionDetected { entity, other });
                }
            }
        }
    }

    fn render(&mut self, ctx: &mut EngineContext, entities: &[EntityId]) {
        if !ctx.config.colliders_visible {
            return;
        }
        let ty = ctx.types.collider;
        for &entity in entities {
            let Some(collider) = ctx.world.get_component(entity, ty).copied() else {
                continue;
            };
            let Some(placement) = place(ctx, entity, Vec2::ZERO, collider.extents) else {
                continue;
            };
            let mut request = DrawRequest::new(
                TextureHandle::WHITE,
                Rect2::new(0.0, 0.0, 1.0, 1.0),
                placement.transform,
            )
            .with_z_index(placement.z_index)
            .with_color(collider.color);
            request.dest_size = placement.dest_size;
            ctx.batcher.queue_draw(request);
        }
    }
}
