//! # Systems
//!
//! A system is a named behavior with up to three phase callbacks plus
//! membership hooks. Every callback is optional: the trait methods default to
//! no-ops and [`SystemTemplate`] leaves unset closures out.

use super::entity::EntityId;

/// Dispatch phase of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Fixed-timestep simulation.
    FixedUpdate,
    /// Variable-timestep update.
    Update,
    /// Draw submission.
    Render,
}

/// Behavior driven by a [`Scheduler`](super::Scheduler).
///
/// `C` is the context every callback receives; it owns the world and any
/// other engine state systems need.
pub trait System<C> {
    /// Called once when an entity starts matching this system.
    fn on_entity_registered(&mut self, _ctx: &mut C, _entity: EntityId) {}

    /// Called once when an entity stops matching this system or is destroyed.
    ///
    /// The entity's components may already be gone.
    fn on_entity_unregistered(&mut self, _ctx: &mut C, _entity: EntityId) {}

    /// Fixed-timestep phase.
    fn fixed_update(&mut self, _ctx: &mut C, _entities: &[EntityId], _delta: f32) {}

    /// Variable-timestep phase.
    fn update(&mut self, _ctx: &mut C, _entities: &[EntityId], _delta: f32) {}

    /// Render phase.
    fn render(&mut self, _ctx: &mut C, _entities: &[EntityId]) {}
}

type HookFn<C> = Box<dyn FnMut(&mut C, EntityId)>;
type TickFn<C> = Box<dyn FnMut(&mut C, &[EntityId], f32)>;
type RenderFn<C> = Box<dyn FnMut(&mut C, &[EntityId])>;

/// Closure-backed system.
///
/// # Example
///
/// ```rust,ignore
/// let template = SystemTemplate::new()
///     .with_update(|ctx: &mut World, entities, delta| { /* ... */ })
///     .with_on_entity_registered(|ctx, entity| { /* ... */ });
/// scheduler.register_system(&mut world, "mover", signature, template)?;
/// ```
pub struct SystemTemplate<C> {
    on_entity_registered: Option<HookFn<C>>,
    on_entity_unregistered: Option<HookFn<C>>,
    fixed_update: Option<TickFn<C>>,
    update: Option<TickFn<C>>,
    render: Option<RenderFn<C>>,
}

impl<C> SystemTemplate<C> {
    /// Creates a template with no callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            on_entity_registered: None,
            on_entity_unregistered: None,
            fixed_update: None,
            update: None,
            render: None,
        }
    }

    /// Sets the registration hook.
    #[must_use]
    pub fn with_on_entity_registered(mut self, f: impl FnMut(&mut C, EntityId) + 'static) -> Self {
        self.on_entity_registered = Some(Box::new(f));
        self
    }

    /// Sets the unregistration hook.
    #[must_use]
    pub fn with_on_entity_unregistered(
        mut self,
        f: impl FnMut(&mut C, EntityId) + 'static,
    ) -> Self {
        self.on_entity_unregistered = Some(Box::new(f));
        self
    }

    /// Sets the fixed-update callback.
    #[must_use]
    pub fn with_fixed_update(
        mut self,
        f: impl FnMut(&mut C, &[EntityId], f32) + 'static,
    ) -> Self {
        self.fixed_update = Some(Box::new(f));
        self
    }

    /// Sets the update callback.
    #[must_use]
    pub fn with_update(mut self, f: impl FnMut(&mut C, &[EntityId], f32) + 'static) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    /// Sets the render callback.
    #[must_use]
    pub fn with_render(mut self, f: impl FnMut(&mut C, &[EntityId]) + 'static) -> Self {
        self.render = Some(Box::new(f));
        self
    }
}

impl<C> Default for SystemTemplate<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> System<C> for SystemTemplate<C> {
    fn on_entity_registered(&mut self, ctx: &mut C, entity: EntityId) {
        if let Some(f) = &mut self.on_entity_registered {
            f(ctx, entity);
        }
    }

    fn on_entity_unregistered(&mut self, ctx: &mut C, entity: EntityId) {
        if let Some(f) = &mut self.on_entity_unregistered {
            f(ctx, entity);
        }
    }

    fn fixed_update(&mut self, ctx: &mut C, entities: &[EntityId], delta: f32) {
        if let Some(f) = &mut self.fixed_update {
            f(ctx, entities, delta);
        }
    }

    fn update(&mut self, ctx: &mut C, entities: &[EntityId], delta: f32) {
        if let Some(f) = &mut self.update {
            f(ctx, entities, delta);
        }
    }

    fn render(&mut self, ctx: &mut C, entities: &[EntityId]) {
        if let Some(f) = &mut self.render {
            f(ctx, entities);
        }
    }
}
