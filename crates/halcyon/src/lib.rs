//! # HALCYON Engine
//!
//! The runtime that ties [`halcyon_core`] and [`halcyon_rendering`] into a
//! playable 2D engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────── Engine ─────────────────────────────┐
//! │                                                                  │
//! │  Scheduler<EngineContext>          EngineContext                 │
//! │  ├─ Collision            ───────>  ├─ World (entities/components)│
//! │  ├─ Sprite Rendering               ├─ SceneTree + TransformCache │
//! │  ├─ Animated Sprite Rendering      ├─ SpatialHashMap             │
//! │  ├─ Color Rect Rendering           ├─ RenderBatcher + Cameras    │
//! │  ├─ Parallax                       ├─ SceneManager (queues)      │
//! │  └─ Script                         └─ EventChannel<EngineEvent>  │
//! │                                                                  │
//! └──────────────── tick(elapsed, &mut impl GraphicsBackend) ───────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use halcyon::{Engine, EngineConfig, components::Sprite};
//!
//! let mut engine = Engine::new(EngineConfig::default())?;
//! let ctx = engine.context_mut();
//! let player = ctx.spawn(None)?;
//! ctx.world.set_component(player, ctx.types.transform, Transform2D::default())?;
//! ctx.queue_entity_for_creation(player);
//! engine.tick(1.0 / 60.0, &mut backend);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod collision;
pub mod components;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod events;
pub mod game_loop;
pub mod scene_manager;
pub mod script;
pub mod systems;

pub use config::EngineConfig;
pub use context::EngineContext;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use events::EngineEvent;
pub use game_loop::{FrameStats, FrameStatsAccumulator};
pub use scene_manager::{SceneBuilder, SceneManager};
pub use script::{NativeScript, NativeScriptHost, ScriptApi, ScriptContext};

pub use halcyon_core;
pub use halcyon_rendering;
