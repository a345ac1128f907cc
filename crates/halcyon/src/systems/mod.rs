//! # Built-in Systems
//!
//! Registered in this order, which is also their dispatch order:
//!
//! | System                    | Signature                     | Phases                 |
//! |---------------------------|-------------------------------|------------------------|
//! | Collision                 | Transform2D + Collider2D      | fixed update, render   |
//! | Sprite Rendering          | Transform2D + Sprite          | render                 |
//! | Animated Sprite Rendering | Transform2D + AnimatedSprite  | render                 |
//! | Color Rect Rendering      | Transform2D + ColorRect       | render                 |
//! | Parallax                  | Transform2D + Parallax        | update                 |
//! | Script                    | Script                        | fixed update, update   |

mod animated_sprite;
mod collision;
mod color_rect;
mod parallax;
mod script;
mod sprite;

pub use animated_sprite::AnimatedSpriteRenderingSystem;
pub use collision::CollisionSystem;
pub use color_rect::ColorRectRenderingSystem;
pub use parallax::ParallaxSystem;
pub use script::ScriptSystem;
pub use sprite::SpriteRenderingSystem;

use halcyon_core::{EntityId, Scheduler, Signature, Size2D, TransformModel2D, Vec2};
use tracing::debug;

use crate::context::EngineContext;
use crate::error::EngineResult;

/// Name of the collision system.
pub const COLLISION: &str = "Collision";
/// Name of the sprite rendering system.
pub const SPRITE_RENDERING: &str = "Sprite Rendering";
/// Name of the animated sprite rendering system.
pub const ANIMATED_SPRITE_RENDERING: &str = "Animated Sprite Rendering";
/// Name of the color rect rendering system.
pub const COLOR_RECT_RENDERING: &str = "Color Rect Rendering";
/// Name of the parallax system.
pub const PARALLAX: &str = "Parallax";
/// Name of the script system.
pub const SCRIPT: &str = "Script";

/// Registers every built-in system.
///
/// # Errors
///
/// Fails if any of the names is already taken.
pub fn register_builtin_systems(
    scheduler: &mut Scheduler<EngineContext>,
    ctx: &mut EngineContext,
) -> EngineResult<()> {
    let types = ctx.types;
    scheduler.register_system(
        ctx,
        COLLISION,
        types.with_transform(types.collider),
        CollisionSystem::new(),
    )?;
    scheduler.register_system(
        ctx,
        SPRITE_RENDERING,
        types.with_transform(types.sprite),
        SpriteRenderingSystem,
    )?;
    scheduler.register_system(
        ctx,
        ANIMATED_SPRITE_RENDERING,
        types.with_transform(types.animated_sprite),
        AnimatedSpriteRenderingSystem,
    )?;
    scheduler.register_system(
        ctx,
        COLOR_RECT_RENDERING,
        types.with_transform(types.color_rect),
        ColorRectRenderingSystem,
    )?;
    scheduler.register_system(
        ctx,
        PARALLAX,
        types.with_transform(types.parallax),
        ParallaxSystem,
    )?;
    scheduler.register_system(
        ctx,
        SCRIPT,
        Signature::of(&[types.script.id()]),
        ScriptSystem,
    )?;
    debug!(systems = scheduler.len(), "built-in systems registered");
    Ok(())
}

/// Screen placement of one drawable.
pub(crate) struct Placement {
    pub transform: TransformModel2D,
    pub dest_size: Size2D,
    pub z_index: i32,
}

/// Resolves `entity` and projects it through the camera it is drawn with.
pub(crate) fn place(
    ctx: &mut EngineContext,
    entity: EntityId,
    origin: Vec2,
    size: Size2D,
) -> Option<Placement> {
    let global = ctx.global_transform(entity)?;
    let camera = ctx.cameras.camera_for(global.ignore_camera);
    Some(Placement {
        transform: camera.project(&global, origin),
        dest_size: camera.dest_size(size),
        z_index: global.z_index,
    })
}
