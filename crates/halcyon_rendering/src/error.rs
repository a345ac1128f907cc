//! Rendering error types.
//!
//! None of these stop a frame: the batcher logs them and drops the batch.

use thiserror::Error;

use crate::handle::{ShaderInstanceId, TextureHandle};

/// Errors reported by a [`GraphicsBackend`](crate::GraphicsBackend).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The texture handle does not resolve to a loaded texture.
    #[error("texture failed to bind: {0:?}")]
    TextureBind(TextureHandle),

    /// The shader instance does not resolve to a compiled shader.
    #[error("shader instance failed to bind: {0:?}")]
    ShaderBind(ShaderInstanceId),

    /// Backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
