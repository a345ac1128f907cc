use halcyon_core::{EntityId, System};

use crate::context::EngineContext;
use crate::script::ScriptHook;

/// Creates script instances and forwards the update phases to the host.
///
/// Deltas are scaled by the entity's total time dilation.
pub struct ScriptSystem;

impl System<EngineContext> for ScriptSystem {
    fn on_entity_registered(&mut self, ctx: &mut EngineContext, entity: EntityId) {
        ctx.create_script_instance(entity);
    }

    fn on_entity_unregistered(&mut self, ctx: &mut EngineContext, entity: EntityId) {
        ctx.delete_script_instance(entity);
    }

    fn fixed_update(&mut self, ctx: &mut EngineContext, entities: &[EntityId], delta: f32) {
        for &entity in entities {
            let dilated = delta * ctx.scene.total_time_dilation(entity);
            ctx.call_script(entity, ScriptHook::PhysicsUpdate(dilated));
        }
    }

    fn update(&mut self, ctx: &mut EngineContext, entities: &[EntityId], delta: f32) {
        for &entity in entities {
            let dilated = delta * ctx.scene.total_time_dilation(entity);
            ctx.call_script(entity, ScriptHook::Update(dilated));
        }
    }
}
