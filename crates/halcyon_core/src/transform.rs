//! # Transform Cache
//!
//! Local transforms are edited through setters that raise a dirty flag.
//! World-space transforms are computed on read, never on write:
//!
//! ```text
//!   read(leaf) ─> chain = [leaf, parent, root]   (nearest ancestors with a transform)
//!                 root   : clean, parent unchanged  -> cached
//!                 parent : dirty                    -> recompute, version += 1
//!                 leaf   : parent version changed   -> recompute
//! ```
//!
//! Each cached global remembers which parent it was composed with and that
//! parent's version. A read recomputes only nodes that are dirty or whose
//! parent moved, so cost is bounded by the depth of the dirty chain and a
//! static hierarchy costs one comparison per level.

use serde::{Deserialize, Serialize};

use crate::ecs::{Component, ComponentType, EntityId, World};
use crate::math::Vec2;
use crate::scene::SceneTree;

/// Position, scale and rotation (degrees) in one space.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformModel2D {
    /// Position.
    pub position: Vec2,
    /// Scale.
    pub scale: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
}

impl TransformModel2D {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        position: Vec2::ZERO,
        scale: Vec2::ONE,
        rotation: 0.0,
    };

    /// Composes `local` inside `self`.
    #[must_use]
    pub fn compose(&self, local: &Self) -> Self {
        Self {
            position: self.position + local.position.scale_by(self.scale).rotated(self.rotation),
            scale: self.scale.scale_by(local.scale),
            rotation: self.rotation + local.rotation,
        }
    }
}

impl Default for TransformModel2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Resolved world-space transform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlobalTransform2D {
    /// World-space position, scale and rotation.
    pub model: TransformModel2D,
    /// Effective z-index.
    pub z_index: i32,
    /// Skip camera offset and zoom when projecting.
    pub ignore_camera: bool,
}

/// Local transform component with its cached global.
///
/// Fields are private so every edit goes through a setter that marks the
/// cache stale.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform2D {
    local: TransformModel2D,
    z_index: i32,
    z_index_relative_to_parent: bool,
    ignore_camera: bool,

    dirty: bool,
    global: GlobalTransform2D,
    /// Bumped on every recompute of `global`.
    version: u32,
    /// Parent the cached global was composed with.
    cached_parent: Option<EntityId>,
    cached_parent_version: u32,
}

impl Component for Transform2D {}

impl Transform2D {
    /// Creates a transform at `position` with unit scale.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self::from_model(TransformModel2D {
            position,
            ..TransformModel2D::IDENTITY
        })
    }

    /// Creates a transform from a full local model.
    #[must_use]
    pub fn from_model(local: TransformModel2D) -> Self {
        Self {
            local,
            z_index: 0,
            z_index_relative_to_parent: true,
            ignore_camera: false,
            dirty: true,
            global: GlobalTransform2D::default(),
            version: 0,
            cached_parent: None,
            cached_parent_version: 0,
        }
    }

    /// Builder: sets the z-index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32, relative_to_parent: bool) -> Self {
        self.set_z_index(z_index);
        self.set_z_index_relative_to_parent(relative_to_parent);
        self
    }

    /// Builder: sets the camera flag.
    #[must_use]
    pub fn with_ignore_camera(mut self, ignore_camera: bool) -> Self {
        self.set_ignore_camera(ignore_camera);
        self
    }

    /// Local transform.
    #[inline]
    #[must_use]
    pub const fn local(&self) -> &TransformModel2D {
        &self.local
    }

    /// Local position.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.local.position
    }

    /// Sets the local position.
    pub fn set_position(&mut self, position: Vec2) {
        self.local.position = position;
        self.dirty = true;
    }

    /// Moves the local position by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        self.set_position(self.local.position + delta);
    }

    /// Local scale.
    #[inline]
    #[must_use]
    pub const fn scale(&self) -> Vec2 {
        self.local.scale
    }

    /// Sets the local scale.
    pub fn set_scale(&mut self, scale: Vec2) {
        self.local.scale = scale;
        self.dirty = true;
    }

    /// Local rotation in degrees.
    #[inline]
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.local.rotation
    }

    /// Sets the local rotation in degrees.
    pub fn set_rotation(&mut self, degrees: f32) {
        self.local.rotation = degrees;
        self.dirty = true;
    }

    /// Own z-index.
    #[inline]
    #[must_use]
    pub const fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Sets the own z-index.
    pub fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index;
        self.dirty = true;
    }

    /// Whether the z-index adds to the parent's.
    #[inline]
    #[must_use]
    pub const fn z_index_relative_to_parent(&self) -> bool {
        self.z_index_relative_to_parent
    }

    /// Sets whether the z-index adds to the parent's.
    pub fn set_z_index_relative_to_parent(&mut self, relative: bool) {
        self.z_index_relative_to_parent = relative;
        self.dirty = true;
    }

    /// Whether projection skips the camera.
    #[inline]
    #[must_use]
    pub const fn ignore_camera(&self) -> bool {
        self.ignore_camera
    }

    /// Sets whether projection skips the camera.
    pub fn set_ignore_camera(&mut self, ignore_camera: bool) {
        self.ignore_camera = ignore_camera;
        self.dirty = true;
    }

    /// Checks if the local transform changed since the global was cached.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Last cached global; may be stale. Use [`TransformCache::resolve`].
    #[inline]
    #[must_use]
    pub const fn cached_global(&self) -> &GlobalTransform2D {
        &self.global
    }

    fn needs_recompute(&self, parent: Option<(EntityId, u32)>) -> bool {
        self.dirty
            || self.cached_parent != parent.map(|(id, _)| id)
            || parent.is_some_and(|(_, version)| version != self.cached_parent_version)
    }

    fn recompute(&mut self, parent: Option<(EntityId, GlobalTransform2D, u32)>) {
        self.global = match parent {
            Some((_, parent_global, _)) => GlobalTransform2D {
                model: parent_global.model.compose(&self.local),
                z_index: if self.z_index_relative_to_parent {
                    parent_global.z_index + self.z_index
                } else {
                    self.z_index
                },
                ignore_camera: self.ignore_camera,
            },
            None => GlobalTransform2D {
                model: self.local,
                z_index: self.z_index,
                ignore_camera: self.ignore_camera,
            },
        };
        self.cached_parent = parent.map(|(id, _, _)| id);
        self.cached_parent_version = parent.map_or(0, |(_, _, version)| version);
        self.version = self.version.wrapping_add(1);
        self.dirty = false;
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

/// Lazily resolves global transforms.
///
/// Holds no transform data itself, only the recompute counters; the cached
/// globals live inside each [`Transform2D`].
#[derive(Debug, Default)]
pub struct TransformCache {
    recompute_count: u64,
    trace: Vec<EntityId>,
    trace_enabled: bool,
    /// Reused ancestor chain buffer.
    chain: Vec<EntityId>,
}

impl TransformCache {
    /// Creates a cache with tracing disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records every recomputed entity until [`TransformCache::take_trace`].
    pub fn set_trace_enabled(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
        if !enabled {
            self.trace.clear();
        }
    }

    /// Returns and clears the recompute trace, in recompute order.
    pub fn take_trace(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.trace)
    }

    /// Total number of recomputations performed.
    #[inline]
    #[must_use]
    pub const fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    /// Nearest ancestor of `entity` that carries a transform.
    #[must_use]
    pub fn transform_parent(
        world: &World,
        scene: &SceneTree,
        transforms: ComponentType<Transform2D>,
        entity: EntityId,
    ) -> Option<EntityId> {
        let mut current = scene.parent(entity);
        while let Some(candidate) = current {
            if world.get_component(candidate, transforms).is_some() {
                return Some(candidate);
            }
            current = scene.parent(candidate);
        }
        None
    }

    /// Resolves the global transform of `entity`.
    ///
    /// Ancestors are resolved first, top down. Returns `None` if the entity
    /// has no transform.
    pub fn resolve(
        &mut self,
        world: &mut World,
        scene: &SceneTree,
        transforms: ComponentType<Transform2D>,
        entity: EntityId,
    ) -> Option<GlobalTransform2D> {
        world.get_component(entity, transforms)?;

        self.chain.clear();
        self.chain.push(entity);
        let mut current = entity;
        while let Some(parent) = Self::transform_parent(world, scene, transforms, current) {
            self.chain.push(parent);
            current = parent;
        }

        let mut parent: Option<(EntityId, GlobalTransform2D, u32)> = None;
        for &node in self.chain.iter().rev() {
            let transform = world.get_component_mut(node, transforms)?;
            if transform.needs_recompute(parent.map(|(id, _, version)| (id, version))) {
                transform.recompute(parent);
                self.recompute_count += 1;
                if self.trace_enabled {
                    self.trace.push(node);
                }
            }
            parent = Some((node, transform.global, transform.version));
        }
        parent.map(|(_, global, _)| global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        world: World,
        scene: SceneTree,
        transforms: ComponentType<Transform2D>,
        cache: TransformCache,
    }

    impl Fixture {
        fn new() -> Self {
            let mut world = World::default();
            let transforms = world.register_component_type::<Transform2D>().unwrap();
            Self {
                world,
                scene: SceneTree::new(),
                transforms,
                cache: TransformCache::new(),
            }
        }

        fn spawn(&mut self, transform: Transform2D, parent: Option<EntityId>) -> EntityId {
            let entity = self.world.create_entity().unwrap();
            self.world.set_component(entity, self.transforms, transform).unwrap();
            match parent {
                Some(parent) => {
                    self.scene.set_parent(entity, parent);
                }
                None => self.scene.insert(entity),
            }
            entity
        }

        fn resolve(&mut self, entity: EntityId) -> GlobalTransform2D {
            self.cache
                .resolve(&mut self.world, &self.scene, self.transforms, entity)
                .unwrap()
        }
    }

    #[test]
    fn test_child_composes_with_parent() {
        let mut fx = Fixture::new();
        let mut parent_t = Transform2D::new(Vec2::new(100.0, 50.0));
        parent_t.set_scale(Vec2::new(2.0, 2.0));
        let parent = fx.spawn(parent_t, None);
        let child = fx.spawn(Transform2D::new(Vec2::new(10.0, 0.0)), Some(parent));

        let global = fx.resolve(child);
        assert_eq!(global.model.position, Vec2::new(120.0, 50.0));
        assert_eq!(global.model.scale, Vec2::new(2.0, 2.0));
    }

    #[test]
    fn test_rotation_applies_to_child_offset() {
        let mut fx = Fixture::new();
        let mut parent_t = Transform2D::default();
        parent_t.set_rotation(90.0);
        let parent = fx.spawn(parent_t, None);
        let child = fx.spawn(Transform2D::new(Vec2::new(10.0, 0.0)), Some(parent));

        let global = fx.resolve(child);
        assert!(global.model.position.x.abs() < 1e-4);
        assert!((global.model.position.y - 10.0).abs() < 1e-4);
        assert_eq!(global.model.rotation, 90.0);
    }

    #[test]
    fn test_static_read_does_not_recompute() {
        let mut fx = Fixture::new();
        let root = fx.spawn(Transform2D::default(), None);
        let leaf = fx.spawn(Transform2D::default(), Some(root));

        fx.resolve(leaf);
        let after_first = fx.cache.recompute_count();
        fx.resolve(leaf);
        fx.resolve(root);
        assert_eq!(fx.cache.recompute_count(), after_first);
    }

    #[test]
    fn test_middle_mutation_recomputes_middle_and_leaf_only() {
        let mut fx = Fixture::new();
        let root = fx.spawn(Transform2D::new(Vec2::new(1.0, 1.0)), None);
        let middle = fx.spawn(Transform2D::new(Vec2::new(2.0, 2.0)), Some(root));
        let leaf = fx.spawn(Transform2D::new(Vec2::new(3.0, 3.0)), Some(middle));

        let before = fx.resolve(leaf).model.position;
        fx.cache.set_trace_enabled(true);

        fx.world
            .get_component_mut(middle, fx.transforms)
            .unwrap()
            .translate(Vec2::new(5.0, -2.0));
        let after = fx.resolve(leaf).model.position;

        assert_eq!(after - before, Vec2::new(5.0, -2.0));
        assert_eq!(fx.cache.take_trace(), vec![middle, leaf]);
    }

    #[test]
    fn test_relative_and_absolute_z_index() {
        let mut fx = Fixture::new();
        let parent = fx.spawn(Transform2D::default().with_z_index(3, false), None);
        let relative = fx.spawn(Transform2D::default().with_z_index(2, true), Some(parent));
        let absolute = fx.spawn(Transform2D::default().with_z_index(2, false), Some(parent));

        assert_eq!(fx.resolve(relative).z_index, 5);
        assert_eq!(fx.resolve(absolute).z_index, 2);
    }

    #[test]
    fn test_reparent_invalidates_cached_global() {
        let mut fx = Fixture::new();
        let a = fx.spawn(Transform2D::new(Vec2::new(10.0, 0.0)), None);
        let b = fx.spawn(Transform2D::new(Vec2::new(0.0, 20.0)), None);
        let child = fx.spawn(Transform2D::new(Vec2::new(1.0, 1.0)), Some(a));

        assert_eq!(fx.resolve(child).model.position, Vec2::new(11.0, 1.0));
        fx.scene.set_parent(child, b);
        assert_eq!(fx.resolve(child).model.position, Vec2::new(1.0, 21.0));
    }

    #[test]
    fn test_ancestor_without_transform_is_skipped() {
        let mut fx = Fixture::new();
        let root = fx.spawn(Transform2D::new(Vec2::new(7.0, 0.0)), None);
        let group = fx.world.create_entity().unwrap();
        fx.scene.set_parent(group, root);
        let leaf = fx.spawn(Transform2D::new(Vec2::new(1.0, 0.0)), Some(group));

        assert_eq!(fx.resolve(leaf).model.position, Vec2::new(8.0, 0.0));
    }

    #[test]
    fn test_ignore_camera_carried_to_global() {
        let mut fx = Fixture::new();
        let entity = fx.spawn(Transform2D::default().with_ignore_camera(true), None);
        assert!(fx.resolve(entity).ignore_camera);
        assert!(!fx.world.get_component(entity, fx.transforms).unwrap().is_dirty());
    }
}
