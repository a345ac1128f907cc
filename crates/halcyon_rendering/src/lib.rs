//! # HALCYON Rendering
//!
//! Turns per-entity draw requests into as few backend submissions as
//! possible.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐ queue_draw ┌──────────────┐ flush_and_render ┌─────────────────┐
//! │ Render-phase │───────────>│ RenderBatcher│─────────────────>│ GraphicsBackend │
//! │   systems    │            │ (per frame)  │  one per batch   │  (rasterizer)   │
//! └──────────────┘            └──────────────┘                  └─────────────────┘
//!        │
//!        └── Camera2D::project (global transform -> screen space)
//! ```
//!
//! Requests are drawn in ascending z-index. Within one z level, requests
//! sharing texture and shader go out as a single batch.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod backend;
pub mod batch;
pub mod camera;
pub mod error;
pub mod handle;
pub mod instance;
pub mod stats;

pub use backend::{BatchSubmission, GraphicsBackend, RecordedSubmission, RecordingBackend};
pub use batch::{DrawRequest, RenderBatcher};
pub use camera::{Camera2D, CameraAnchorMode, CameraManager, CameraMode};
pub use error::{RenderError, RenderResult};
pub use handle::{ShaderInstanceId, TextureHandle};
pub use instance::SpriteInstance;
pub use stats::RenderStats;
