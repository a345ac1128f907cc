//! # Engine Events
//!
//! Notifications raised by built-in systems and the scene manager, delivered
//! through [`EventChannel`](halcyon_core::EventChannel) subscriptions.
//!
//! ```text
//! ┌──────────────────┐                     ┌────────────────┐
//! │ Animated Sprite  │── FrameChanged ────>│                │
//! │   Rendering      │── Finished ────────>│  EventChannel  │──> subscribers
//! │ Collision        │── CollisionDetected>│  <EngineEvent> │    (in order)
//! │ SceneManager     │── EntityDeleted ───>│                │
//! └──────────────────┘                     └────────────────┘
//! ```

use halcyon_core::EntityId;

/// Events emitted by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineEvent {
    // =========================================================================
    // Lifecycle
    // =========================================================================
    /// A queued deletion was carried out; the id is no longer alive.
    EntityDeleted {
        /// Deleted entity.
        entity: EntityId,
    },

    // =========================================================================
    // Animation (Animated Sprite Rendering)
    // =========================================================================
    /// The displayed frame changed.
    AnimationFrameChanged {
        /// Animated entity.
        entity: EntityId,
        /// New frame index.
        frame: usize,
    },

    /// The last frame of an animation was reached.
    AnimationFinished {
        /// Animated entity.
        entity: EntityId,
        /// Animation name.
        animation: String,
    },

    // =========================================================================
    // Collision
    // =========================================================================
    /// Two colliders overlap after a fixed update.
    ///
    /// Raised once per pair and pass, `entity` being the one registered first.
    CollisionDetected {
        /// First collider.
        entity: EntityId,
        /// Overlapping collider.
        other: EntityId,
    },
}

impl EngineEvent {
    /// Entity the event is about.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        match self {
            Self::EntityDeleted { entity }
            | Self::AnimationFrameChanged { entity, .. }
            | Self::AnimationFinished { entity, .. }
            | Self::CollisionDetected { entity, .. } => *entity,
        }
    }
}
