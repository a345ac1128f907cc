use halcyon_core::{EntityId, Size2D, System};
use halcyon_rendering::DrawRequest;

use super::place;
use crate::context::EngineContext;

/// Queues one draw per sprite.
pub struct SpriteRenderingSystem;

impl System<EngineContext> for SpriteRenderingSystem {
    fn render(&mut self, ctx: &mut EngineContext, entities: &[EntityId]) {
        let ty = ctx.types.sprite;
        for &entity in entities {
            let Some(sprite) = ctx.world.get_component(entity, ty).cloned() else {
                continue;
            };
            let source = sprite.draw_source;
            let Some(placement) = place(ctx, entity, sprite.origin, Size2D::new(source.w, source.h))
            else {
                continue;
            };
            ctx.batcher.queue_draw(DrawRequest {
                texture: sprite.texture,
                source_rect: source,
                dest_size: placement.dest_size,
                color: sprite.modulate,
                flip_h: sprite.flip_h,
                flip_v: sprite.flip_v,
                transform: placement.transform,
                z_index: placement.z_index,
                shader: sprite.shader,
            });
        }
    }
}
