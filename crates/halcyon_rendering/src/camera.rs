//! # 2D Camera
//!
//! Maps resolved world-space transforms to screen space.
//!
//! ```text
//! screen.position = (global.position - viewport + offset) * zoom - origin * scale * zoom
//! screen.scale    = global.scale
//! dest_size       = source_size * zoom
//! ```
//!
//! Entities flagged `ignore_camera` are projected with the default camera
//! instead of the current one, so HUD elements stay put while the view moves.

use halcyon_core::{EntityId, GlobalTransform2D, Rect2, Size2D, TransformModel2D, Vec2};

/// How the viewport is driven.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraMode {
    /// Viewport is set explicitly.
    #[default]
    Manual,
    /// Viewport tracks an entity's global position.
    FollowEntity(EntityId),
}

/// Where a followed entity sits in the view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraAnchorMode {
    /// Entity position becomes the top-left of the view.
    #[default]
    FixedTopLeft,
    /// Entity is kept at the center of the view.
    DragCenter,
}

/// A 2D camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera2D {
    /// World-space area the viewport is clamped to.
    pub boundary: Rect2,
    /// World-space top-left of the view.
    pub viewport: Vec2,
    /// Screen-space shift applied after the viewport.
    pub offset: Vec2,
    /// Per-axis magnification.
    pub zoom: Vec2,
    /// Manual or following.
    pub mode: CameraMode,
    /// Placement of a followed entity.
    pub anchor: CameraAnchorMode,
}

impl Camera2D {
    /// Unbounded camera at the origin with no zoom.
    #[must_use]
    pub fn new() -> Self {
        Self {
            boundary: Rect2::new(f32::MIN / 2.0, f32::MIN / 2.0, f32::MAX, f32::MAX),
            viewport: Vec2::ZERO,
            offset: Vec2::ZERO,
            zoom: Vec2::ONE,
            mode: CameraMode::Manual,
            anchor: CameraAnchorMode::FixedTopLeft,
        }
    }

    /// Starts tracking an entity.
    pub fn follow_entity(&mut self, entity: EntityId) {
        self.mode = CameraMode::FollowEntity(entity);
    }

    /// Stops tracking `entity`. No-op if another entity (or none) is followed.
    pub fn unfollow_entity(&mut self, entity: EntityId) {
        if self.mode == CameraMode::FollowEntity(entity) {
            self.mode = CameraMode::Manual;
        }
    }

    /// Entity being followed.
    #[must_use]
    pub fn followed_entity(&self) -> Option<EntityId> {
        match self.mode {
            CameraMode::FollowEntity(entity) => Some(entity),
            CameraMode::Manual => None,
        }
    }

    /// Moves the viewport so `target` sits at the anchor, then clamps.
    pub fn look_at(&mut self, target: Vec2, resolution: Size2D) {
        self.viewport = match self.anchor {
            CameraAnchorMode::FixedTopLeft => target,
            CameraAnchorMode::DragCenter => {
                target - Vec2::new(resolution.w / 2.0, resolution.h / 2.0)
            }
        };
        self.clamp_viewport_to_boundary(resolution);
    }

    /// Keeps the visible area inside `boundary`.
    pub fn clamp_viewport_to_boundary(&mut self, resolution: Size2D) {
        let view_w = resolution.w / self.zoom.x.max(f32::EPSILON);
        let view_h = resolution.h / self.zoom.y.max(f32::EPSILON);
        let max_x = (self.boundary.right() - view_w).max(self.boundary.x);
        let max_y = (self.boundary.bottom() - view_h).max(self.boundary.y);
        self.viewport.x = self.viewport.x.clamp(self.boundary.x, max_x);
        self.viewport.y = self.viewport.y.clamp(self.boundary.y, max_y);
    }

    /// Projects a global transform to screen space.
    ///
    /// `origin` is the pivot in unscaled sprite pixels.
    #[must_use]
    pub fn project(&self, global: &GlobalTransform2D, origin: Vec2) -> TransformModel2D {
        let model = &global.model;
        let position = (model.position - self.viewport + self.offset).scale_by(self.zoom);
        let pivot = origin.scale_by(model.scale).scale_by(self.zoom);
        TransformModel2D {
            position: position - pivot,
            scale: model.scale,
            rotation: model.rotation,
        }
    }

    /// Screen size of `size` world units.
    #[must_use]
    pub fn dest_size(&self, size: Size2D) -> Size2D {
        Size2D::new(size.w * self.zoom.x, size.h * self.zoom.y)
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::new()
    }
}

/// Current and default camera.
#[derive(Clone, Copy, Debug, Default)]
pub struct CameraManager {
    current: Camera2D,
    default: Camera2D,
}

impl CameraManager {
    /// Both cameras at their defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active camera.
    #[must_use]
    pub const fn current(&self) -> &Camera2D {
        &self.current
    }

    /// The active camera, for edits.
    pub fn current_mut(&mut self) -> &mut Camera2D {
        &mut self.current
    }

    /// The fixed camera used for camera-independent entities.
    #[must_use]
    pub const fn default_camera(&self) -> &Camera2D {
        &self.default
    }

    /// Replaces the active camera.
    pub fn set_current(&mut self, camera: Camera2D) {
        self.current = camera;
    }

    /// Camera an entity is drawn with.
    #[must_use]
    pub const fn camera_for(&self, ignore_camera: bool) -> &Camera2D {
        if ignore_camera {
            &self.default
        } else {
            &self.current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_at(x: f32, y: f32) -> GlobalTransform2D {
        GlobalTransform2D {
            model: TransformModel2D {
                position: Vec2::new(x, y),
                ..TransformModel2D::IDENTITY
            },
            ..GlobalTransform2D::default()
        }
    }

    #[test]
    fn test_project_applies_viewport_offset_zoom() {
        let mut camera = Camera2D::new();
        camera.viewport = Vec2::new(50.0, 0.0);
        camera.offset = Vec2::new(10.0, 10.0);
        camera.zoom = Vec2::new(2.0, 2.0);

        let screen = camera.project(&global_at(100.0, 20.0), Vec2::ZERO);
        assert_eq!(screen.position, Vec2::new(120.0, 60.0));
        assert_eq!(camera.dest_size(Size2D::new(16.0, 8.0)), Size2D::new(32.0, 16.0));
    }

    #[test]
    fn test_project_subtracts_origin() {
        let camera = Camera2D::new();
        let screen = camera.project(&global_at(100.0, 100.0), Vec2::new(8.0, 8.0));
        assert_eq!(screen.position, Vec2::new(92.0, 92.0));
    }

    #[test]
    fn test_ignore_camera_uses_default() {
        let mut cameras = CameraManager::new();
        cameras.current_mut().viewport = Vec2::new(500.0, 500.0);

        let global = global_at(10.0, 10.0);
        let hud = cameras.camera_for(true).project(&global, Vec2::ZERO);
        let world = cameras.camera_for(false).project(&global, Vec2::ZERO);
        assert_eq!(hud.position, Vec2::new(10.0, 10.0));
        assert_eq!(world.position, Vec2::new(-490.0, -490.0));
    }

    #[test]
    fn test_look_at_clamps_to_boundary() {
        let mut camera = Camera2D::new();
        camera.boundary = Rect2::new(0.0, 0.0, 1000.0, 1000.0);
        camera.anchor = CameraAnchorMode::DragCenter;
        let resolution = Size2D::new(200.0, 100.0);

        camera.look_at(Vec2::new(50.0, 50.0), resolution);
        assert_eq!(camera.viewport, Vec2::ZERO);
        camera.look_at(Vec2::new(500.0, 500.0), resolution);
        assert_eq!(camera.viewport, Vec2::new(400.0, 450.0));
        camera.look_at(Vec2::new(990.0, 990.0), resolution);
        assert_eq!(camera.viewport, Vec2::new(800.0, 900.0));
    }

    #[test]
    fn test_follow_and_unfollow() {
        let mut camera = Camera2D::new();
        let target = EntityId::new(3, 0);
        camera.follow_entity(target);
        camera.unfollow_entity(EntityId::new(4, 0));
        assert_eq!(camera.followed_entity(), Some(target));
        camera.unfollow_entity(target);
        assert_eq!(camera.mode, CameraMode::Manual);
    }
}
