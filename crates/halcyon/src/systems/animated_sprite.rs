use halcyon_core::{EntityId, Size2D, System};
use halcyon_rendering::DrawRequest;
use rand::Rng;

use super::place;
use crate::context::EngineContext;
use crate::events::EngineEvent;

/// Advances animations from the engine clock, scaled by each entity's total
/// time dilation, and draws the current frame.
pub struct AnimatedSpriteRenderingSystem;

impl System<EngineContext> for AnimatedSpriteRenderingSystem {
    fn on_entity_registered(&mut self, ctx: &mut EngineContext, entity: EntityId) {
        let ty = ctx.types.animated_sprite;
        let now = ctx.now_ms();
        let Some(max_stagger) = ctx
            .world
            .get_component(entity, ty)
            .map(|sprite| u64::from(sprite.max_stagger_ms))
        else {
            return;
        };
        let stagger = if max_stagger == 0 {
            0
        } else {
            ctx.rng.gen_range(0..=max_stagger)
        };
        if let Some(sprite) = ctx.world.get_component_mut(entity, ty) {
            sprite.stagger_ms = stagger;
            if sprite.is_playing() {
                sprite.start_ms = now;
            }
        }
    }

    fn render(&mut self, ctx: &mut EngineContext, entities: &[EntityId]) {
        let ty = ctx.types.animated_sprite;
        let now = ctx.now_ms();
        for &entity in entities {
            let dilation = ctx.scene.total_time_dilation(entity);
            let Some(sprite) = ctx.world.get_component_mut(entity, ty) else {
                continue;
            };
            if let Some((frame, last)) = sprite.advance(now, dilation) {
                ctx.events
                    .publish(&EngineEvent::AnimationFrameChanged { entity, frame });
                if last {
                    let animation = sprite.current_animation().to_owned();
                    ctx.events
                        .publish(&EngineEvent::AnimationFinished { entity, animation });
                }
            }

            let Some(frame) = sprite.current_frame().copied() else {
                continue;
            };
            let (origin, modulate, flip_h, flip_v, shader) = (
                sprite.origin,
                sprite.modulate,
                sprite.flip_h,
                sprite.flip_v,
                sprite.shader,
            );
            let source = frame.draw_source;
            let Some(placement) = place(ctx, entity, origin, Size2D::new(source.w, source.h))
            else {
                continue;
            };
            ctx.batcher.queue_draw(DrawRequest {
                texture: frame.texture,
                source_rect: source,
                dest_size: placement.dest_size,
                color: modulate,
                flip_h,
                flip_v,
                transform: placement.transform,
                z_index: placement.z_index,
                shader,
            });
        }
    }
}
