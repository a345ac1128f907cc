//! # Entity Component System
//!
//! Signature-driven ECS for a single simulation thread.
//!
//! ## Design Philosophy
//!
//! - Component types get small integer ids at registration, never runtime type lookups on the hot path
//! - Components are stored in direct-indexed arrays keyed by entity index
//! - Entity IDs are indices with generation counters
//! - Systems see exactly the entities whose signature satisfies theirs

mod component;
mod entity;
pub mod scheduler;
mod signature;
mod storage;
mod system;
mod world;

pub use component::{Component, ComponentInfo, ComponentType, ComponentTypeId};
pub use entity::{Entity, EntityId};
pub use scheduler::{PhaseStats, Scheduler};
pub use signature::{Signature, MAX_COMPONENT_TYPES};
pub use storage::ComponentStorage;
pub use system::{Phase, System, SystemTemplate};
pub use world::{EcsContext, World, WorldConfig, DEFAULT_MAX_ENTITIES};
