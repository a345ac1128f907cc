use halcyon_core::{EntityId, Rect2, System, Vec2};
use halcyon_rendering::{DrawRequest, TextureHandle};

use super::place;
use crate::context::EngineContext;

/// Draws solid rectangles by stretching the white texture.
pub struct ColorRectRenderingSystem;

impl System<EngineContext> for ColorRectRenderingSystem {
    fn render(&mut self, ctx: &mut EngineContext, entities: &[EntityId]) {
        let ty = ctx.types.color_rect;
        for &entity in entities {
            let Some(rect) = ctx.world.get_component(entity, ty).copied() else {
                continue;
            };
            let Some(placement) = place(ctx, entity, Vec2::ZERO, rect.size) else {
                continue;
            };
            let mut request = DrawRequest::new(
                TextureHandle::WHITE,
                Rect2::new(0.0, 0.0, 1.0, 1.0),
                placement.transform,
            )
            .with_z_index(placement.z_index)
            .with_color(rect.color);
            request.dest_size = placement.dest_size;
            ctx.batcher.queue_draw(request);
        }
    }
}
