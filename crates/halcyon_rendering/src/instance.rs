//! Per-sprite instance data for upload.

use bytemuck::{Pod, Zeroable};
use halcyon_core::{Color, Rect2, Size2D, TransformModel2D};

/// Per-instance data handed to the backend.
///
/// A batch is a contiguous slice of these; backends upload it as raw bytes
/// with `bytemuck::cast_slice`. All fields are 16-byte rows.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Screen-space destination: x, y, width, height.
    pub dest: [f32; 4],

    /// Source rect in texture pixels: u0, v0, u1, v1.
    /// Flipping swaps the pair on that axis.
    pub source: [f32; 4],

    /// Modulate color, RGBA.
    pub color: [f32; 4],

    /// Rotation in degrees in x, z-index in y, zw unused.
    pub rotation_z: [f32; 4],
}

impl SpriteInstance {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Builds an instance from a projected transform.
    ///
    /// A negative scale mirrors through the source rect, like a flip.
    #[must_use]
    #[allow(clippy::fn_params_excessive_bools, clippy::cast_precision_loss)]
    pub fn new(
        transform: &TransformModel2D,
        dest_size: Size2D,
        source: Rect2,
        color: Color,
        flip_h: bool,
        flip_v: bool,
        z_index: i32,
    ) -> Self {
        let flip_h = flip_h != (transform.scale.x < 0.0);
        let flip_v = flip_v != (transform.scale.y < 0.0);
        let size = dest_size.scaled(transform.scale);

        let (u0, u1) = if flip_h {
            (source.right(), source.x)
        } else {
            (source.x, source.right())
        };
        let (v0, v1) = if flip_v {
            (source.bottom(), source.y)
        } else {
            (source.y, source.bottom())
        };

        Self {
            dest: [transform.position.x, transform.position.y, size.w, size.h],
            source: [u0, v0, u1, v1],
            color: color.to_array(),
            rotation_z: [transform.rotation, z_index as f32, 0.0, 0.0],
        }
    }

    /// Checks if the source is mirrored horizontally.
    #[must_use]
    pub fn is_flipped_h(&self) -> bool {
        self.source[2] < self.source[0]
    }

    /// Checks if the source is mirrored vertically.
    #[must_use]
    pub fn is_flipped_v(&self) -> bool {
        self.source[3] < self.source[1]
    }
}
