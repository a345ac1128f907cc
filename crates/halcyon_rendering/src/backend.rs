//! # Graphics Backend Contract
//!
//! The rasterizer lives outside the engine. The batcher hands it one
//! [`BatchSubmission`] per batch, in draw order.

use std::collections::HashSet;

use halcyon_core::Color;

use crate::error::{RenderError, RenderResult};
use crate::handle::{ShaderInstanceId, TextureHandle};
use crate::instance::SpriteInstance;

/// One draw submission: every instance shares texture and shader.
#[derive(Debug, Clone, Copy)]
pub struct BatchSubmission<'a> {
    /// Texture to bind.
    pub texture: TextureHandle,
    /// Shader to bind, `None` for the default sprite shader.
    pub shader: Option<ShaderInstanceId>,
    /// Z level of every instance in the batch.
    pub z_index: i32,
    /// Instances in queue order.
    pub instances: &'a [SpriteInstance],
}

impl BatchSubmission<'_> {
    /// Instance data as bytes, ready for a vertex buffer upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.instances)
    }
}

/// Rasterizer interface.
pub trait GraphicsBackend {
    /// Clears the render target.
    fn clear(&mut self, color: Color);

    /// Draws one batch.
    ///
    /// # Errors
    ///
    /// Returns a bind error when the texture or shader cannot be used;
    /// the batcher drops the batch and carries on.
    fn submit_batch(&mut self, batch: &BatchSubmission<'_>) -> RenderResult<()>;
}

/// Owned copy of a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSubmission {
    /// Texture bound.
    pub texture: TextureHandle,
    /// Shader bound.
    pub shader: Option<ShaderInstanceId>,
    /// Z level.
    pub z_index: i32,
    /// Instances drawn.
    pub instances: Vec<SpriteInstance>,
}

/// Backend that records what it is asked to draw.
///
/// Used by headless runs and tests. Textures and shaders can be marked
/// missing to exercise bind failures.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// Clear colors, one per frame.
    pub clears: Vec<Color>,
    /// Accepted submissions, in order.
    pub submissions: Vec<RecordedSubmission>,
    missing_textures: HashSet<TextureHandle>,
    missing_shaders: HashSet<ShaderInstanceId>,
}

impl RecordingBackend {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes binds of `texture` fail.
    pub fn mark_texture_missing(&mut self, texture: TextureHandle) {
        self.missing_textures.insert(texture);
    }

    /// Makes binds of `shader` fail.
    pub fn mark_shader_missing(&mut self, shader: ShaderInstanceId) {
        self.missing_shaders.insert(shader);
    }

    /// Z levels of the accepted submissions, in order.
    #[must_use]
    pub fn z_order(&self) -> Vec<i32> {
        self.submissions.iter().map(|s| s.z_index).collect()
    }

    /// Forgets everything recorded so far.
    pub fn reset(&mut self) {
        self.clears.clear();
        self.submissions.clear();
    }
}

impl GraphicsBackend for RecordingBackend {
    fn clear(&mut self, color: Color) {
        self.clears.push(color);
    }

    fn submit_batch(&mut self, batch: &BatchSubmission<'_>) -> RenderResult<()> {
        if self.missing_textures.contains(&batch.texture) {
            return Err(RenderError::TextureBind(batch.texture));
        }
        if let Some(shader) = batch.shader.filter(|s| self.missing_shaders.contains(s)) {
            return Err(RenderError::ShaderBind(shader));
        }
        self.submissions.push(RecordedSubmission {
            texture: batch.texture,
            shader: batch.shader,
            z_index: batch.z_index,
            instances: batch.instances.to_vec(),
        });
        Ok(())
    }
}
