//! # Scripting
//!
//! Script hosts receive entity lifecycle callbacks and drive entities through
//! [`ScriptApi`], a narrow facade over the engine context.
//!
//! ```text
//!  Script component joins ──> on_create_instance
//!  end of spawn frame ──────> on_start
//!  every fixed step ────────> on_physics_update
//!  every frame ─────────────> on_update
//!  queue_deletion ──────────> on_end
//!  deletion processed ──────> on_delete_instance
//! ```
//!
//! [`NativeScriptHost`] runs scripts written in Rust, registered by class name.

use std::collections::HashMap;

use halcyon_core::{Color, EntityId, Vec2};
use tracing::{debug, warn};

use crate::collision;
use crate::context::EngineContext;
use crate::error::EngineResult;

// ============================================================================
// HOST CONTRACT
// ============================================================================

/// A script runtime plugged into the engine.
pub trait ScriptContext {
    /// Instantiates `class_name` for `entity`. Returns `false` if the class is
    /// unknown.
    fn on_create_instance(&mut self, entity: EntityId, class_name: &str) -> bool;

    /// Drops the instance of `entity`, if any.
    fn on_delete_instance(&mut self, entity: EntityId);

    /// First callback after the entity's creation frame.
    fn on_start(&mut self, api: &mut ScriptApi<'_>);

    /// Variable-timestep update.
    fn on_update(&mut self, api: &mut ScriptApi<'_>, delta: f32);

    /// Fixed-timestep update.
    fn on_physics_update(&mut self, api: &mut ScriptApi<'_>, delta: f32);

    /// The entity was queued for deletion.
    fn on_end(&mut self, api: &mut ScriptApi<'_>);
}

/// Lifecycle callback routed to a host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum ScriptHook {
    Start,
    Update(f32),
    PhysicsUpdate(f32),
    End,
}

impl ScriptHook {
    pub(crate) fn dispatch(self, host: &mut dyn ScriptContext, api: &mut ScriptApi<'_>) {
        match self {
            Self::Start => host.on_start(api),
            Self::Update(delta) => host.on_update(api, delta),
            Self::PhysicsUpdate(delta) => host.on_physics_update(api, delta),
            Self::End => host.on_end(api),
        }
    }
}

// ============================================================================
// SCRIPT API
// ============================================================================

/// What a script may do to its entity and the world around it.
pub struct ScriptApi<'a> {
    ctx: &'a mut EngineContext,
    entity: EntityId,
}

impl<'a> ScriptApi<'a> {
    pub(crate) fn new(ctx: &'a mut EngineContext, entity: EntityId) -> Self {
        Self { ctx, entity }
    }

    /// The scripted entity.
    #[inline]
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Engine clock, in milliseconds.
    #[must_use]
    pub fn time_ms(&self) -> u64 {
        self.ctx.now_ms()
    }

    /// Local position.
    #[must_use]
    pub fn position(&self) -> Option<Vec2> {
        let transform = self.ctx.world.get_component(self.entity, self.ctx.types.transform)?;
        Some(transform.position())
    }

    /// Sets the local position and refreshes the entity's collider.
    pub fn set_position(&mut self, position: Vec2) {
        if let Some(transform) = self
            .ctx
            .world
            .get_component_mut(self.entity, self.ctx.types.transform)
        {
            transform.set_position(position);
            self.ctx.refresh_collider(self.entity);
        }
    }

    /// Moves by `delta` and refreshes the entity's collider.
    pub fn translate(&mut self, delta: Vec2) {
        if let Some(position) = self.position() {
            self.set_position(position + delta);
        }
    }

    /// World-space position.
    pub fn global_position(&mut self) -> Option<Vec2> {
        Some(self.ctx.global_transform(self.entity)?.model.position)
    }

    /// Modulate color of the entity's sprite or animated sprite.
    #[must_use]
    pub fn modulate(&self) -> Option<Color> {
        let types = self.ctx.types;
        let world = &self.ctx.world;
        world
            .get_component(self.entity, types.sprite)
            .map(|sprite| sprite.modulate)
            .or_else(|| {
                world
                    .get_component(self.entity, types.animated_sprite)
                    .map(|sprite| sprite.modulate)
            })
    }

    /// Sets the modulate color of the entity's sprites.
    pub fn set_modulate(&mut self, color: Color) {
        let types = self.ctx.types;
        if let Some(sprite) = self.ctx.world.get_component_mut(self.entity, types.sprite) {
            sprite.modulate = color;
        }
        if let Some(sprite) = self
            .ctx
            .world
            .get_component_mut(self.entity, types.animated_sprite)
        {
            sprite.modulate = color;
        }
    }

    /// Plays a named animation. Returns `false` if there is no such animation.
    pub fn play_animation(&mut self, name: &str) -> bool {
        let now = self.ctx.now_ms();
        self.ctx
            .world
            .get_component_mut(self.entity, self.ctx.types.animated_sprite)
            .is_some_and(|sprite| sprite.play(name, now))
    }

    /// Stops the current animation.
    pub fn stop_animation(&mut self) {
        if let Some(sprite) = self
            .ctx
            .world
            .get_component_mut(self.entity, self.ctx.types.animated_sprite)
        {
            sprite.stop();
        }
    }

    /// Colliders overlapping this entity's collider.
    #[must_use]
    pub fn collisions(&self) -> Vec<EntityId> {
        collision::process_entity_collisions(&self.ctx.spatial, self.entity)
    }

    /// Colliders containing a point, e.g. the mouse cursor.
    #[must_use]
    pub fn collisions_at(&self, point: Vec2) -> Vec<EntityId> {
        collision::process_point_collisions(&self.ctx.spatial, point)
    }

    /// Own time dilation of the entity.
    #[must_use]
    pub fn time_dilation(&self) -> f32 {
        self.ctx.scene.time_dilation(self.entity)
    }

    /// Sets the entity's time dilation. Descendants inherit it
    /// multiplicatively.
    pub fn set_time_dilation(&mut self, dilation: f32) {
        self.ctx.scene.set_time_dilation(self.entity, dilation);
    }

    /// Time dilation including every ancestor's.
    #[must_use]
    pub fn total_time_dilation(&self) -> f32 {
        self.ctx.scene.total_time_dilation(self.entity)
    }

    /// Queues a switch to another scene at the end of the frame.
    ///
    /// Returns `false` if a scene change is already queued.
    pub fn change_scene<F>(&mut self, name: impl Into<String>, build: F) -> bool
    where
        F: FnOnce(&mut EngineContext) -> EngineResult<()> + 'static,
    {
        self.ctx.queue_scene_change(name, build)
    }

    /// Queues this entity for deletion at the end of the frame.
    pub fn queue_deletion(&mut self) -> bool {
        self.ctx.queue_entity_for_deletion(self.entity)
    }

    /// Full engine access for anything the facade does not cover.
    pub fn context(&mut self) -> &mut EngineContext {
        &mut *self.ctx
    }
}

// ============================================================================
// NATIVE SCRIPTS
// ============================================================================

/// Script implemented in Rust. Every callback is optional.
pub trait NativeScript {
    /// See [`ScriptContext::on_start`].
    fn on_start(&mut self, _api: &mut ScriptApi<'_>) {}

    /// See [`ScriptContext::on_update`].
    fn on_update(&mut self, _api: &mut ScriptApi<'_>, _delta: f32) {}

    /// See [`ScriptContext::on_physics_update`].
    fn on_physics_update(&mut self, _api: &mut ScriptApi<'_>, _delta: f32) {}

    /// See [`ScriptContext::on_end`].
    fn on_end(&mut self, _api: &mut ScriptApi<'_>) {}
}

type ScriptFactory = Box<dyn Fn() -> Box<dyn NativeScript>>;

/// Class registry and live instances of native scripts.
#[derive(Default)]
pub struct NativeScriptHost {
    classes: HashMap<String, ScriptFactory>,
    instances: HashMap<EntityId, Box<dyn NativeScript>>,
}

impl NativeScriptHost {
    /// Creates an empty host.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class. A duplicate name keeps the first factory and warns.
    pub fn register_class<F, S>(&mut self, class_name: impl Into<String>, factory: F) -> bool
    where
        F: Fn() -> S + 'static,
        S: NativeScript + 'static,
    {
        let class_name = class_name.into();
        if self.classes.contains_key(&class_name) {
            warn!(class = %class_name, "native script class already registered");
            return false;
        }
        debug!(class = %class_name, "registered native script class");
        self.classes
            .insert(class_name, Box::new(move || Box::new(factory()) as Box<dyn NativeScript>));
        true
    }

    /// Checks if `class_name` is registered.
    #[must_use]
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    /// Number of live instances.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

impl ScriptContext for NativeScriptHost {
    fn on_create_instance(&mut self, entity: EntityId, class_name: &str) -> bool {
        let Some(factory) = self.classes.get(class_name) else {
            warn!(class = %class_name, entity = ?entity, "unknown native script class");
            return false;
        };
        self.instances.insert(entity, factory());
        true
    }

    fn on_delete_instance(&mut self, entity: EntityId) {
        self.instances.remove(&entity);
    }

    fn on_start(&mut self, api: &mut ScriptApi<'_>) {
        if let Some(instance) = self.instances.get_mut(&api.entity()) {
            instance.on_start(api);
        }
    }

    fn on_update(&mut self, api: &mut ScriptApi<'_>, delta: f32) {
        if let Some(instance) = self.instances.get_mut(&api.entity()) {
            instance.on_update(api, delta);
        }
    }

    fn on_physics_update(&mut self, api: &mut ScriptApi<'_>, delta: f32) {
        if let Some(instance) = self.instances.get_mut(&api.entity()) {
            instance.on_physics_update(api, delta);
        }
    }

    fn on_end(&mut self, api: &mut ScriptApi<'_>) {
        if let Some(instance) = self.instances.get_mut(&api.entity()) {
            instance.on_end(api);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Idle;

    impl NativeScript for Idle {}

    #[test]
    fn test_duplicate_class_keeps_first() {
        let mut host = NativeScriptHost::new();
        assert!(host.register_class("Idle", || Idle));
        assert!(!host.register_class("Idle", || Idle));
        assert!(host.has_class("Idle"));
    }

    #[test]
    fn test_instance_lifecycle() {
        let mut host = NativeScriptHost::new();
        host.register_class("Idle", || Idle);
        let entity = EntityId::new(0, 0);

        assert!(!host.on_create_instance(entity, "Missing"));
        assert!(host.on_create_instance(entity, "Idle"));
        assert_eq!(host.instance_count(), 1);
        host.on_delete_instance(entity);
        assert_eq!(host.instance_count(), 0);
    }
}
