//! # Core Error Types
//!
//! Configuration errors raised while a world is being assembled.
//!
//! Runtime lookups never error: a missing component is `None`, an unknown
//! entity yields an empty collision set.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors that can occur while building or mutating the ECS.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// More component types were registered than a signature can hold.
    #[error("too many component types: limit is {limit}")]
    TooManyComponentTypes {
        /// The configured maximum.
        limit: usize,
    },

    /// The same Rust type was registered as a component twice.
    #[error("component type already registered: {0}")]
    DuplicateComponentType(&'static str),

    /// The component type handle was not issued by this world.
    #[error("component type not registered in this world: {0}")]
    UnregisteredComponentType(&'static str),

    /// A system with the same name is already registered.
    #[error("system already registered: {0}")]
    DuplicateSystem(String),

    /// All entity slots are in use.
    #[error("entity capacity exceeded: {capacity} live entities")]
    EntityCapacityExceeded {
        /// Maximum number of live entities.
        capacity: usize,
    },

    /// The entity id is stale or was never allocated.
    #[error("entity is not alive: {0:?}")]
    DeadEntity(EntityId),
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
