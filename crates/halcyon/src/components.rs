//! # Built-in Components
//!
//! Plain data attached to entities. Behavior lives in [`crate::systems`].
//!
//! | Component        | Systems                               |
//! |------------------|---------------------------------------|
//! | `Transform2D`    | every system below                    |
//! | `Collider2D`     | Collision                             |
//! | `Sprite`         | Sprite Rendering                      |
//! | `AnimatedSprite` | Animated Sprite Rendering             |
//! | `ColorRect`      | Color Rect Rendering                  |
//! | `Parallax`       | Parallax                              |
//! | `Script`         | Script                                |

use std::collections::HashMap;

use halcyon_core::{
    Color, Component, ComponentType, EcsResult, Rect2, Signature, Size2D, Transform2D, Vec2, World,
};
use halcyon_rendering::{ShaderInstanceId, TextureHandle};

// ============================================================================
// SPRITES
// ============================================================================

/// A single textured quad.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    /// Texture to sample.
    pub texture: TextureHandle,
    /// Region of the texture, in pixels.
    pub draw_source: Rect2,
    /// Pivot in unscaled sprite pixels.
    pub origin: Vec2,
    /// Mirror horizontally.
    pub flip_h: bool,
    /// Mirror vertically.
    pub flip_v: bool,
    /// Color multiplied into every texel.
    pub modulate: Color,
    /// Shader, `None` for the default.
    pub shader: Option<ShaderInstanceId>,
}

impl Component for Sprite {}

impl Sprite {
    /// Sprite drawing `draw_source` of `texture` unmodulated.
    #[must_use]
    pub fn new(texture: TextureHandle, draw_source: Rect2) -> Self {
        Self {
            texture,
            draw_source,
            origin: Vec2::ZERO,
            flip_h: false,
            flip_v: false,
            modulate: Color::WHITE,
            shader: None,
        }
    }
}

/// One frame of an [`Animation`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationFrame {
    /// Texture to sample.
    pub texture: TextureHandle,
    /// Region of the texture, in pixels.
    pub draw_source: Rect2,
}

/// Named frame sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Animation {
    /// Frames in play order.
    pub frames: Vec<AnimationFrame>,
    /// Milliseconds per frame.
    pub speed_ms: u32,
    /// Restart after the last frame.
    pub looping: bool,
}

impl Animation {
    /// Creates an animation.
    #[must_use]
    pub fn new(frames: Vec<AnimationFrame>, speed_ms: u32, looping: bool) -> Self {
        Self {
            frames,
            speed_ms: speed_ms.max(1),
            looping,
        }
    }
}

/// Sprite cycling through named animations.
///
/// Frame selection happens in the render phase from the engine clock:
/// `((now - start + stagger) / speed_ms * dilation) % frame_count`, clamped
/// instead of wrapped when not looping. The stagger is drawn when the entity
/// joins the rendering system so identical sprites spawned together do not
/// animate in lockstep.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedSprite {
    animations: HashMap<String, Animation>,
    current: String,
    frame_index: usize,
    playing: bool,
    /// Clock time (ms) the current animation started.
    pub(crate) start_ms: u64,
    /// Phase offset (ms) drawn from `0..=max_stagger_ms`.
    pub(crate) stagger_ms: u64,
    /// Upper bound for the random phase offset.
    pub max_stagger_ms: u32,
    /// Pivot in unscaled sprite pixels.
    pub origin: Vec2,
    /// Mirror horizontally.
    pub flip_h: bool,
    /// Mirror vertically.
    pub flip_v: bool,
    /// Color multiplied into every texel.
    pub modulate: Color,
    /// Shader, `None` for the default.
    pub shader: Option<ShaderInstanceId>,
}

impl Component for AnimatedSprite {}

impl AnimatedSprite {
    /// Creates a sprite with one animation, playing it from the first frame.
    #[must_use]
    pub fn new(name: impl Into<String>, animation: Animation) -> Self {
        let name = name.into();
        let mut animations = HashMap::new();
        animations.insert(name.clone(), animation);
        Self {
            animations,
            current: name,
            frame_index: 0,
            playing: true,
            start_ms: 0,
            stagger_ms: 0,
            max_stagger_ms: 0,
            origin: Vec2::ZERO,
            flip_h: false,
            flip_v: false,
            modulate: Color::WHITE,
            shader: None,
        }
    }

    /// Adds or replaces an animation.
    pub fn add_animation(&mut self, name: impl Into<String>, animation: Animation) {
        self.animations.insert(name.into(), animation);
    }

    /// Looks up an animation by name.
    #[must_use]
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }

    /// Name of the current animation.
    #[must_use]
    pub fn current_animation(&self) -> &str {
        &self.current
    }

    /// Index of the displayed frame.
    #[inline]
    #[must_use]
    pub const fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Displayed frame, `None` if the current animation has no frames.
    #[must_use]
    pub fn current_frame(&self) -> Option<&AnimationFrame> {
        self.animations.get(&self.current)?.frames.get(self.frame_index)
    }

    /// Checks if the animation advances.
    #[inline]
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Switches to `name` and plays it from its first frame at `now_ms`.
    ///
    /// Returns `false` (and changes nothing) for an unknown name.
    pub fn play(&mut self, name: &str, now_ms: u64) -> bool {
        if !self.animations.contains_key(name) {
            return false;
        }
        if self.current != name {
            self.current = name.to_owned();
            self.frame_index = 0;
        }
        self.playing = true;
        self.start_ms = now_ms;
        true
    }

    /// Freezes on the displayed frame.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Recomputes the frame for `now_ms`, with elapsed time scaled by
    /// `dilation`.
    ///
    /// A non-looping animation holds its last frame once the clock runs past
    /// it. Returns the new index and whether it is the last frame, or `None`
    /// if nothing changed.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub(crate) fn advance(&mut self, now_ms: u64, dilation: f32) -> Option<(usize, bool)> {
        if !self.playing {
            return None;
        }
        let animation = self.animations.get(&self.current)?;
        let count = animation.frames.len() as u64;
        if count == 0 {
            return None;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms) + self.stagger_ms;
        let speed = f64::from(animation.speed_ms.max(1));
        let ticks = (elapsed as f64 / speed * f64::from(dilation)) as u64;
        let index = (if animation.looping {
            ticks % count
        } else {
            ticks.min(count - 1)
        }) as usize;
        if index == self.frame_index {
            return None;
        }
        let last = index as u64 + 1 == count;
        if last && !animation.looping {
            self.playing = false;
        }
        self.frame_index = index;
        Some((index, last))
    }
}

// ============================================================================
// SHAPES & COLLISION
// ============================================================================

/// Solid colored rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorRect {
    /// Size in world units.
    pub size: Size2D,
    /// Fill color.
    pub color: Color,
}

impl Component for ColorRect {}

/// Axis-aligned collision box anchored at the entity's global position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider2D {
    /// Unscaled width and height.
    pub extents: Size2D,
    /// Outline color when colliders are drawn.
    pub color: Color,
}

impl Component for Collider2D {}

impl Collider2D {
    /// Collider with the default debug color.
    #[must_use]
    pub fn new(extents: Size2D) -> Self {
        Self {
            extents,
            color: Color::new(0.373, 0.8, 0.894, 0.75),
        }
    }
}

// ============================================================================
// SCROLLING & SCRIPTING
// ============================================================================

/// Layer that follows the camera at a fraction of its speed.
///
/// The layer's own position is captured the first time the Parallax system
/// sees it; afterwards position = captured + viewport * `scroll_speed`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Parallax {
    /// Per-axis share of the camera motion (0 = world-fixed, 1 = screen-fixed).
    pub scroll_speed: Vec2,
    pub(crate) cached_local_position: Option<Vec2>,
}

impl Component for Parallax {}

impl Parallax {
    /// Creates a layer.
    #[must_use]
    pub const fn new(scroll_speed: Vec2) -> Self {
        Self {
            scroll_speed,
            cached_local_position: None,
        }
    }
}

/// Binds an entity to a script class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Script {
    /// Class name looked up in the script host.
    pub class_name: String,
}

impl Component for Script {}

impl Script {
    /// Creates a script binding.
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Handles of every built-in component type.
#[derive(Clone, Copy, Debug)]
pub struct ComponentTypes {
    /// `Transform2D`.
    pub transform: ComponentType<Transform2D>,
    /// `Sprite`.
    pub sprite: ComponentType<Sprite>,
    /// `AnimatedSprite`.
    pub animated_sprite: ComponentType<AnimatedSprite>,
    /// `ColorRect`.
    pub color_rect: ComponentType<ColorRect>,
    /// `Collider2D`.
    pub collider: ComponentType<Collider2D>,
    /// `Parallax`.
    pub parallax: ComponentType<Parallax>,
    /// `Script`.
    pub script: ComponentType<Script>,
}

impl ComponentTypes {
    /// Registers the built-in types in a fixed order.
    ///
    /// # Errors
    ///
    /// Fails if any type is already registered or the type limit is reached.
    pub fn register(world: &mut World) -> EcsResult<Self> {
        Ok(Self {
            transform: world.register_component_type()?,
            sprite: world.register_component_type()?,
            animated_sprite: world.register_component_type()?,
            color_rect: world.register_component_type()?,
            collider: world.register_component_type()?,
            parallax: world.register_component_type()?,
            script: world.register_component_type()?,
        })
    }

    /// Signature of `Transform2D` plus one more type.
    #[must_use]
    pub fn with_transform<T>(&self, other: ComponentType<T>) -> Signature {
        Signature::of(&[self.transform.id(), other.id()])
    }
}
