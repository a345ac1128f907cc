//! # HALCYON Core Engine
//!
//! Signature-driven Entity Component System for 2D games:
//! - Dense, direct-indexed component storage (no hashing on the hot path)
//! - Systems selected by component signature, dispatched in three phases
//! - Lazily cached global transforms over a parent/child scene tree
//! - Incremental spatial hash for broad-phase collision queries
//!
//! ## Architecture Rules
//!
//! 1. **No hidden globals** - every structure is owned by the caller
//! 2. **Deterministic dispatch** - registration order is execution order
//! 3. **Pull, don't push** - derived data is recomputed when read, not on write
//!
//! ## Example
//!
//! ```rust,ignore
//! use halcyon_core::{World, WorldConfig};
//!
//! let mut world = World::new(WorldConfig::default());
//! let transforms = world.register_component_type::<Transform2D>()?;
//! let entity = world.create_entity()?;
//! world.set_component(entity, transforms, Transform2D::default());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod error;
pub mod event;
pub mod math;
pub mod scene;
pub mod spatial;
pub mod transform;

pub use ecs::{
    Component, ComponentType, ComponentTypeId, EcsContext, Entity, EntityId, Phase, PhaseStats,
    Scheduler, Signature, System, SystemTemplate, World, WorldConfig, MAX_COMPONENT_TYPES,
};
pub use error::{EcsError, EcsResult};
pub use event::{EventChannel, Subscription, SubscriptionId};
pub use math::{Color, Rect2, Size2D, Vec2};
pub use scene::SceneTree;
pub use spatial::{CellCoord, SpatialHashHandle, SpatialHashMap};
pub use transform::{GlobalTransform2D, Transform2D, TransformCache, TransformModel2D};
