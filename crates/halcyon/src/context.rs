//! # Engine Context
//!
//! Every piece of engine state in one owned value. Systems receive it as
//! `&mut EngineContext`; nothing lives in globals, so several engines can
//! run side by side (one per test, for instance).

use halcyon_core::{
    EcsContext, EntityId, EventChannel, GlobalTransform2D, Rect2, SceneTree, SpatialHashMap,
    Transform2D, TransformCache, World,
};
use halcyon_rendering::{CameraManager, RenderBatcher};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::components::ComponentTypes;
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::events::EngineEvent;
use crate::scene_manager::SceneManager;
use crate::script::{NativeScriptHost, ScriptApi, ScriptContext, ScriptHook};

/// Engine state shared by all systems.
pub struct EngineContext {
    /// Entities and components.
    pub world: World,
    /// Parent/child links.
    pub scene: SceneTree,
    /// Global transform resolver.
    pub transforms: TransformCache,
    /// Collision broad phase.
    pub spatial: SpatialHashMap,
    /// Draw requests of the current frame.
    pub batcher: RenderBatcher,
    /// Current and default camera.
    pub cameras: CameraManager,
    /// Deferred creation and deletion.
    pub scene_manager: SceneManager,
    /// Engine notifications.
    pub events: EventChannel<EngineEvent>,
    /// Settings the engine was built with.
    pub config: EngineConfig,
    /// Built-in component type handles.
    pub types: ComponentTypes,
    /// Seeded generator for animation stagger.
    pub rng: StdRng,
    /// Seconds since start.
    time: f64,
    /// Taken out while a callback runs.
    script_host: Option<Box<dyn ScriptContext>>,
    /// `on_end` calls raised while the host was busy.
    pending_script_ends: Vec<EntityId>,
}

impl EngineContext {
    /// Builds a context and registers the built-in component types.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the component type limit
    /// is too small for the built-in types.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let mut world = World::new(config.world_config());
        let types = ComponentTypes::register(&mut world)?;
        Ok(Self {
            world,
            scene: SceneTree::new(),
            transforms: TransformCache::new(),
            spatial: SpatialHashMap::new(config.spatial_cell_size()),
            batcher: RenderBatcher::new(),
            cameras: CameraManager::new(),
            scene_manager: SceneManager::new(),
            events: EventChannel::new(config.event_capacity),
            rng: StdRng::seed_from_u64(config.rng_seed),
            types,
            config,
            time: 0.0,
            script_host: Some(Box::new(NativeScriptHost::new())),
            pending_script_ends: Vec::new(),
        })
    }

    // ========================================================================
    // CLOCK
    // ========================================================================

    /// Seconds since the engine started.
    #[inline]
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Milliseconds since the engine started.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn now_ms(&self) -> u64 {
        (self.time * 1000.0) as u64
    }

    pub(crate) fn advance_time(&mut self, seconds: f32) {
        self.time += f64::from(seconds.max(0.0));
    }

    // ========================================================================
    // ENTITIES
    // ========================================================================

    /// Creates an entity and places it in the scene tree.
    ///
    /// With no parent it becomes the scene root if there is none yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the entity capacity is exhausted.
    pub fn spawn(&mut self, parent: Option<EntityId>) -> EngineResult<EntityId> {
        let entity = self.world.create_entity()?;
        self.scene.insert(entity);
        match parent {
            Some(parent) => {
                self.scene.set_parent(entity, parent);
            }
            None if self.scene.root().is_none() => self.scene.set_root(entity),
            None => {}
        }
        Ok(entity)
    }

    /// Resolves the global transform of an entity.
    pub fn global_transform(&mut self, entity: EntityId) -> Option<GlobalTransform2D> {
        self.transforms
            .resolve(&mut self.world, &self.scene, self.types.transform, entity)
    }

    /// Points the current camera at the entity it follows, if any.
    pub fn update_camera_follow(&mut self) {
        let Some(target) = self.cameras.current().followed_entity() else {
            return;
        };
        if let Some(global) = self.global_transform(target) {
            let resolution = self.config.resolution;
            self.cameras
                .current_mut()
                .look_at(global.model.position, resolution);
        }
    }

    /// Local transform of an entity, for edits.
    pub fn transform_mut(&mut self, entity: EntityId) -> Option<&mut Transform2D> {
        self.world.get_component_mut(entity, self.types.transform)
    }

    // ========================================================================
    // COLLISION
    // ========================================================================

    /// World-space collider rectangle: global position, extents times the
    /// magnitude of the global scale.
    pub fn collision_rect(&mut self, entity: EntityId) -> Option<Rect2> {
        let extents = self.world.get_component(entity, self.types.collider)?.extents;
        let global = self.global_transform(entity)?;
        Some(Rect2::from_position_size(
            global.model.position,
            extents.scaled(global.model.scale),
        ))
    }

    /// Moves an entity's spatial hash entry to its current collider rect.
    ///
    /// Entities without a transform or collider are left out of the grid.
    pub fn refresh_collider(&mut self, entity: EntityId) {
        if let Some(rect) = self.collision_rect(entity) {
            self.spatial.insert_or_update(entity, rect);
        }
    }

    // ========================================================================
    // CREATION / DELETION
    // ========================================================================

    /// Queues an entity whose scripts receive `on_start` at the end of the
    /// frame. Components should be attached before queueing.
    pub fn queue_entity_for_creation(&mut self, entity: EntityId) -> bool {
        self.scene_manager.queue_creation(entity)
    }

    /// Queues an entity for deletion at the end of the frame and fires its
    /// script's `on_end`.
    ///
    /// The entity stays alive until [`EngineContext::process_queued_deletions`].
    /// Returns `false`, with a warning, if it is already queued.
    pub fn queue_entity_for_deletion(&mut self, entity: EntityId) -> bool {
        if !self.scene_manager.queue_deletion(entity) {
            return false;
        }
        self.call_script(entity, ScriptHook::End);
        true
    }

    /// Deletes every queued entity together with its scene subtree.
    ///
    /// Descendants go before their parents. Each deleted entity loses its
    /// script instance, its scene node, its spatial hash entry and its
    /// components, then its id is freed and [`EngineEvent::EntityDeleted`] is
    /// published. System unregistration hooks fire on the scheduler's next
    /// sync.
    ///
    /// Returns the number of entities deleted.
    pub fn process_queued_deletions(&mut self) -> usize {
        let queued = self.scene_manager.take_deletions();
        let mut deleted = 0;
        for root in queued {
            let mut doomed = self.scene.descendants(root);
            doomed.push(root);
            for entity in doomed {
                if self.delete_entity(entity) {
                    deleted += 1;
                }
            }
        }
        deleted
    }

    fn delete_entity(&mut self, entity: EntityId) -> bool {
        if !self.world.is_alive(entity) {
            return false;
        }
        if let Some(host) = self.script_host.as_mut() {
            host.on_delete_instance(entity);
        }
        self.scene.remove(entity);
        self.spatial.remove(entity);
        self.cameras.current_mut().unfollow_entity(entity);
        self.world.destroy_entity(entity);
        debug!(entity = ?entity, "entity deleted");
        self.events.publish(&EngineEvent::EntityDeleted { entity });
        true
    }

    /// Queues a switch to scene `name`. See
    /// [`SceneManager::queue_scene_change`].
    pub fn queue_scene_change<F>(&mut self, name: impl Into<String>, build: F) -> bool
    where
        F: FnOnce(&mut Self) -> EngineResult<()> + 'static,
    {
        self.scene_manager.queue_scene_change(name, build)
    }

    /// Applies the queued scene change, if any.
    ///
    /// Every node of the current tree is queued for deletion (firing
    /// `on_end`) and deleted, then the new scene's builder runs on the
    /// emptied tree; its first parentless spawn becomes the new root.
    ///
    /// Returns the number of entities deleted.
    ///
    /// # Errors
    ///
    /// Returns the builder's error. The old scene is gone at that point.
    pub fn process_queued_scene_change(&mut self) -> EngineResult<usize> {
        let Some((name, build)) = self.scene_manager.take_scene_change() else {
            return Ok(0);
        };
        if let Some(root) = self.scene.root() {
            let mut old = self.scene.descendants(root);
            old.push(root);
            for entity in old {
                if !self.scene_manager.is_queued_for_deletion(entity) {
                    self.queue_entity_for_deletion(entity);
                }
            }
        }
        let deleted = self.process_queued_deletions();
        info!(scene = %name, deleted, "scene changed");
        build(self)?;
        Ok(deleted)
    }

    /// Fires `on_start` for every queued creation still alive.
    ///
    /// Returns the number of entities started.
    pub fn process_queued_creations(&mut self) -> usize {
        let queued = self.scene_manager.take_creations();
        let mut started = 0;
        for entity in queued {
            if self.world.is_alive(entity) {
                self.call_script(entity, ScriptHook::Start);
                started += 1;
            }
        }
        started
    }

    // ========================================================================
    // SCRIPTING
    // ========================================================================

    /// Replaces the script host.
    pub fn set_script_host(&mut self, host: impl ScriptContext + 'static) {
        self.script_host = Some(Box::new(host));
    }

    /// Script host, `None` while one of its callbacks is running.
    pub fn script_host_mut(&mut self) -> Option<&mut (dyn ScriptContext + 'static)> {
        self.script_host.as_deref_mut()
    }

    pub(crate) fn create_script_instance(&mut self, entity: EntityId) {
        let Some(class_name) = self
            .world
            .get_component(entity, self.types.script)
            .map(|script| script.class_name.clone())
        else {
            return;
        };
        match self.script_host.as_mut() {
            Some(host) => {
                host.on_create_instance(entity, &class_name);
            }
            None => warn!(entity = ?entity, "script instance created during a script callback"),
        }
    }

    pub(crate) fn delete_script_instance(&mut self, entity: EntityId) {
        if let Some(host) = self.script_host.as_mut() {
            host.on_delete_instance(entity);
        }
    }

    /// Runs one lifecycle callback for a scripted entity.
    ///
    /// The host is taken out for the duration so the script can borrow the
    /// context. `on_end` raised from inside a callback runs right after it.
    pub(crate) fn call_script(&mut self, entity: EntityId, hook: ScriptHook) {
        if !self.world.has_component(entity, self.types.script.id()) {
            return;
        }
        let Some(mut host) = self.script_host.take() else {
            if hook == ScriptHook::End {
                self.pending_script_ends.push(entity);
            }
            return;
        };
        hook.dispatch(host.as_mut(), &mut ScriptApi::new(self, entity));
        self.script_host = Some(host);

        while let Some(ended) = self.pending_script_ends.pop() {
            self.call_script(ended, ScriptHook::End);
        }
    }
}

impl EcsContext for EngineContext {
    fn world(&self) -> &World {
        &self.world
    }

    fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

#[cfg(test)]
mod tests {
    use halcyon_core::{Size2D, Vec2};

    use super::*;
    use crate::components::Collider2D;

    #[test]
    fn test_first_spawn_becomes_root() {
        let mut ctx = EngineContext::new(EngineConfig::default()).unwrap();
        let root = ctx.spawn(None).unwrap();
        let child = ctx.spawn(Some(root)).unwrap();
        assert_eq!(ctx.scene.root(), Some(root));
        assert_eq!(ctx.scene.parent(child), Some(root));
    }

    #[test]
    fn test_collision_rect_uses_global_scale() {
        let mut ctx = EngineContext::new(EngineConfig::default()).unwrap();
        let parent = ctx.spawn(None).unwrap();
        let child = ctx.spawn(Some(parent)).unwrap();
        let types = ctx.types;

        let mut parent_transform = Transform2D::new(Vec2::new(10.0, 0.0));
        parent_transform.set_scale(Vec2::new(2.0, -2.0));
        ctx.world.set_component(parent, types.transform, parent_transform).unwrap();
        ctx.world
            .set_component(child, types.transform, Transform2D::new(Vec2::new(5.0, 0.0)))
            .unwrap();
        ctx.world
            .set_component(child, types.collider, Collider2D::new(Size2D::new(4.0, 3.0)))
            .unwrap();

        let rect = ctx.collision_rect(child).unwrap();
        assert_eq!(rect, Rect2::new(20.0, 0.0, 8.0, 6.0));
    }

    #[test]
    fn test_deletion_is_deferred() {
        let mut ctx = EngineContext::new(EngineConfig::default()).unwrap();
        let entity = ctx.spawn(None).unwrap();
        let events = ctx.events.subscribe();

        assert!(ctx.queue_entity_for_deletion(entity));
        assert!(!ctx.queue_entity_for_deletion(entity));
        assert!(ctx.world.is_alive(entity));

        assert_eq!(ctx.process_queued_deletions(), 1);
        assert!(!ctx.world.is_alive(entity));
        assert_eq!(events.drain(), vec![EngineEvent::EntityDeleted { entity }]);
    }

    #[test]
    fn test_deleted_entity_leaves_spatial_hash() {
        let mut ctx = EngineContext::new(EngineConfig::default()).unwrap();
        let types = ctx.types;
        let a = ctx.spawn(None).unwrap();
        let b = ctx.spawn(Some(a)).unwrap();
        for entity in [a, b] {
            ctx.world
                .set_component(entity, types.transform, Transform2D::new(Vec2::ZERO))
                .unwrap();
            ctx.world
                .set_component(entity, types.collider, Collider2D::new(Size2D::new(8.0, 8.0)))
                .unwrap();
            ctx.refresh_collider(entity);
        }
        assert_eq!(ctx.spatial.compute_collisions(a), vec![b]);

        ctx.queue_entity_for_deletion(b);
        ctx.process_queued_deletions();
        assert!(ctx.spatial.compute_collisions(a).is_empty());
        assert!(!ctx.spatial.contains(b));
    }

    #[test]
    fn test_scene_change_replaces_tree() {
        let mut ctx = EngineContext::new(EngineConfig::default()).unwrap();
        let old_root = ctx.spawn(None).unwrap();
        let old_child = ctx.spawn(Some(old_root)).unwrap();
        let loose = ctx.spawn(None).unwrap();

        assert!(ctx.queue_scene_change("arena", |ctx| {
            let root = ctx.spawn(None)?;
            ctx.spawn(Some(root))?;
            Ok(())
        }));
        assert!(!ctx.queue_scene_change("menu", |_| Ok(())));
        assert!(ctx.world.is_alive(old_root));

        assert_eq!(ctx.process_queued_scene_change().unwrap(), 2);
        assert!(!ctx.world.is_alive(old_root));
        assert!(!ctx.world.is_alive(old_child));
        assert!(ctx.world.is_alive(loose));

        let new_root = ctx.scene.root().unwrap();
        assert_ne!(new_root, old_root);
        assert_eq!(ctx.scene.children(new_root).len(), 1);
        assert_eq!(ctx.scene_manager.active_scene(), Some("arena"));
        assert_eq!(ctx.process_queued_scene_change().unwrap(), 0);
    }

    #[test]
    fn test_deletion_takes_subtree() {
        let mut ctx = EngineContext::new(EngineConfig::default()).unwrap();
        let root = ctx.spawn(None).unwrap();
        let child = ctx.spawn(Some(root)).unwrap();
        let grandchild = ctx.spawn(Some(child)).unwrap();

        ctx.queue_entity_for_deletion(child);
        assert_eq!(ctx.process_queued_deletions(), 2);
        assert!(ctx.world.is_alive(root));
        assert!(!ctx.world.is_alive(grandchild));
        assert!(ctx.scene.children(root).is_empty());
    }
}
