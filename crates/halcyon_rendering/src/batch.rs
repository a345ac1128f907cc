//! # Render Batcher
//!
//! Collects draw requests for a frame and flushes them in z order.
//!
//! ## Flush
//!
//! 1. Clear the target.
//! 2. Stable-sort requests by z-index, lowest first (higher z paints over).
//! 3. Within each z level, group by (texture, shader) in order of first
//!    appearance.
//! 4. One submission per group. A group whose texture or shader fails to
//!    bind is dropped with a warning; the frame goes on.
//! 5. Clear the request list.

use halcyon_core::{Color, Rect2, Size2D, TransformModel2D};
use tracing::warn;

use crate::backend::{BatchSubmission, GraphicsBackend};
use crate::handle::{ShaderInstanceId, TextureHandle};
use crate::instance::SpriteInstance;
use crate::stats::RenderStats;

/// One sprite draw, already projected to screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRequest {
    /// Texture to sample.
    pub texture: TextureHandle,
    /// Region of the texture, in pixels.
    pub source_rect: Rect2,
    /// Size on screen before the transform's scale.
    pub dest_size: Size2D,
    /// Modulate color.
    pub color: Color,
    /// Mirror the source horizontally.
    pub flip_h: bool,
    /// Mirror the source vertically.
    pub flip_v: bool,
    /// Screen-space transform (see [`Camera2D::project`](crate::Camera2D::project)).
    pub transform: TransformModel2D,
    /// Draw order; lower is drawn first.
    pub z_index: i32,
    /// Shader, `None` for the default.
    pub shader: Option<ShaderInstanceId>,
}

impl DrawRequest {
    /// Creates a request drawing the whole `source_rect` at its own size.
    #[must_use]
    pub fn new(texture: TextureHandle, source_rect: Rect2, transform: TransformModel2D) -> Self {
        Self {
            texture,
            source_rect,
            dest_size: Size2D::new(source_rect.w, source_rect.h),
            color: Color::WHITE,
            flip_h: false,
            flip_v: false,
            transform,
            z_index: 0,
            shader: None,
        }
    }

    /// Builder: sets the z-index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Builder: sets the shader.
    #[must_use]
    pub fn with_shader(mut self, shader: Option<ShaderInstanceId>) -> Self {
        self.shader = shader;
        self
    }

    /// Builder: sets the modulate color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    fn key(&self) -> (TextureHandle, Option<ShaderInstanceId>) {
        (self.texture, self.shader)
    }

    fn instance(&self) -> SpriteInstance {
        SpriteInstance::new(
            &self.transform,
            self.dest_size,
            self.source_rect,
            self.color,
            self.flip_h,
            self.flip_v,
            self.z_index,
        )
    }
}

/// Per-frame draw request accumulator.
#[derive(Debug, Default)]
pub struct RenderBatcher {
    requests: Vec<DrawRequest>,
    /// Reused buffers for grouping a z level.
    keys: Vec<(TextureHandle, Option<ShaderInstanceId>)>,
    instances: Vec<SpriteInstance>,
    last_stats: RenderStats,
}

impl RenderBatcher {
    /// Creates an empty batcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request to the current frame. Nothing is drawn until
    /// [`RenderBatcher::flush_and_render`].
    #[inline]
    pub fn queue_draw(&mut self, request: DrawRequest) {
        self.requests.push(request);
    }

    /// Requests queued so far this frame.
    #[inline]
    #[must_use]
    pub fn queued(&self) -> &[DrawRequest] {
        &self.requests
    }

    /// Statistics of the last flush.
    #[inline]
    #[must_use]
    pub const fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    /// Draws every queued request and starts a new frame.
    #[allow(clippy::cast_possible_truncation)]
    pub fn flush_and_render<B>(&mut self, backend: &mut B, background: Color) -> RenderStats
    where
        B: GraphicsBackend + ?Sized,
    {
        let mut stats = RenderStats {
            requests: self.requests.len() as u32,
            ..RenderStats::default()
        };

        backend.clear(background);
        // Stable: equal z keeps queue order
        self.requests.sort_by_key(|r| r.z_index);

        let mut start = 0;
        while start < self.requests.len() {
            let z_index = self.requests[start].z_index;
            let end = self.requests[start..]
                .iter()
                .position(|r| r.z_index != z_index)
                .map_or(self.requests.len(), |offset| start + offset);
            let level = &self.requests[start..end];

            self.keys.clear();
            for request in level {
                if !self.keys.contains(&request.key()) {
                    self.keys.push(request.key());
                }
            }

            for &(texture, shader) in &self.keys {
                self.instances.clear();
                self.instances.extend(
                    level
                        .iter()
                        .filter(|r| r.key() == (texture, shader))
                        .map(DrawRequest::instance),
                );
                stats.batches += 1;

                let submission = BatchSubmission {
                    texture,
                    shader,
                    z_index,
                    instances: &self.instances,
                };
                match backend.submit_batch(&submission) {
                    Ok(()) => stats.draw_calls += 1,
                    Err(error) => {
                        warn!(%error, z_index, count = self.instances.len(), "dropping draw batch");
                        stats.dropped_requests += self.instances.len() as u32;
                    }
                }
            }
            start = end;
        }

        self.requests.clear();
        self.last_stats = stats;
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;

    fn request(texture: u32, z_index: i32) -> DrawRequest {
        DrawRequest::new(
            TextureHandle(texture),
            Rect2::new(0.0, 0.0, 8.0, 8.0),
            TransformModel2D::IDENTITY,
        )
        .with_z_index(z_index)
    }

    #[test]
    fn test_batches_flush_in_ascending_z() {
        let mut batcher = RenderBatcher::new();
        let mut backend = RecordingBackend::new();
        for z in [5, 1, 3] {
            batcher.queue_draw(request(1, z));
        }

        let stats = batcher.flush_and_render(&mut backend, Color::BLACK);
        assert_eq!(backend.z_order(), vec![1, 3, 5]);
        assert_eq!(stats.draw_calls, 3);
        assert!(batcher.queued().is_empty());
    }

    #[test]
    fn test_same_texture_and_z_share_a_batch() {
        let mut batcher = RenderBatcher::new();
        let mut backend = RecordingBackend::new();
        batcher.queue_draw(request(1, 0));
        batcher.queue_draw(request(2, 0));
        batcher.queue_draw(request(1, 0));
        batcher.queue_draw(request(1, 0).with_shader(Some(ShaderInstanceId(4))));

        let stats = batcher.flush_and_render(&mut backend, Color::BLACK);
        assert_eq!(stats.batches, 3);
        assert_eq!(backend.submissions[0].texture, TextureHandle(1));
        assert_eq!(backend.submissions[0].instances.len(), 2);
        assert_eq!(backend.submissions[1].texture, TextureHandle(2));
        assert_eq!(backend.submissions[2].shader, Some(ShaderInstanceId(4)));
    }

    #[test]
    fn test_bind_failure_drops_batch_only() {
        let mut batcher = RenderBatcher::new();
        let mut backend = RecordingBackend::new();
        backend.mark_texture_missing(TextureHandle(9));
        batcher.queue_draw(request(9, 0));
        batcher.queue_draw(request(9, 0));
        batcher.queue_draw(request(1, 1));

        let stats = batcher.flush_and_render(&mut backend, Color::BLACK);
        assert_eq!(stats.dropped_requests, 2);
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(backend.submissions.len(), 1);
    }

    #[test]
    fn test_flush_clears_target_every_frame() {
        let mut batcher = RenderBatcher::new();
        let mut backend = RecordingBackend::new();
        let background = Color::from_rgba8(33, 33, 33, 255);
        batcher.flush_and_render(&mut backend, background);
        batcher.flush_and_render(&mut backend, background);
        assert_eq!(backend.clears, vec![background, background]);
        assert!(backend.submissions.is_empty());
    }
}
