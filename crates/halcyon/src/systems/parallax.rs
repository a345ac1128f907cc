use halcyon_core::{EntityId, System};

use crate::context::EngineContext;

/// Offsets layers by a share of the camera viewport.
pub struct ParallaxSystem;

impl System<EngineContext> for ParallaxSystem {
    fn update(&mut self, ctx: &mut EngineContext, entities: &[EntityId], _delta: f32) {
        let viewport = ctx.cameras.current().viewport;
        let types = ctx.types;
        for &entity in entities {
            let Some(parallax) = ctx.world.get_component(entity, types.parallax).copied() else {
                continue;
            };
            let Some(transform) = ctx.world.get_component_mut(entity, types.transform) else {
                continue;
            };
            let base = parallax
                .cached_local_position
                .unwrap_or_else(|| transform.position());
            let position = base + viewport.scale_by(parallax.scroll_speed);
            if transform.position() != position {
                transform.set_position(position);
            }
            if let Some(parallax) = ctx.world.get_component_mut(entity, types.parallax) {
                parallax.cached_local_position = Some(base);
            }
        }
    }
}
