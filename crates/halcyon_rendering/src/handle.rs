//! Opaque asset handles.
//!
//! The engine never loads asset bytes; it only passes these ids through to
//! the backend, which resolves them.

/// Texture id issued by the asset manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// The 1x1 white texture every backend provides, used for solid fills.
    pub const WHITE: Self = Self(0);
}

/// Shader instance id issued by the shader cache.
///
/// Draw requests without one use the backend's default sprite shader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderInstanceId(pub u32);
