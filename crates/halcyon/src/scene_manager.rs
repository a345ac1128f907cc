//! # Scene Manager
//!
//! End-of-frame queues for entity creation, entity deletion and scene
//! changes.
//!
//! Deletion is deferred so that systems iterating this frame never see an
//! entity vanish under them: a queued entity stays alive and fully
//! queryable until [`EngineContext::process_queued_deletions`] runs after the
//! render phase.
//!
//!
//! At most one scene change waits at a time. When it is processed every node
//! of the current tree is queued for deletion and deleted, then the new
//! scene's builder populates the emptied tree.
//!
//! [`EngineContext::process_queued_deletions`]: crate::EngineContext::process_queued_deletions

use std::fmt;

use halcyon_core::EntityId;
use tracing::warn;

use crate::context::EngineContext;
use crate::error::EngineResult;

/// Populates a scene: spawns its entities and queues them for creation.
pub type SceneBuilder = Box<dyn FnOnce(&mut EngineContext) -> EngineResult<()>>;

struct PendingScene {
    name: String,
    build: SceneBuilder,
}

impl fmt::Debug for PendingScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingScene").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Pending creations, deletions and scene change.
#[derive(Debug, Default)]
pub struct SceneManager {
    creation_queue: Vec<EntityId>,
    deletion_queue: Vec<EntityId>,
    queued_scene: Option<PendingScene>,
    active_scene: Option<String>,
}

impl SceneManager {
    /// Creates empty queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an entity whose scripts start at the end of the frame.
    ///
    /// Returns `false` if it is already queued.
    pub fn queue_creation(&mut self, entity: EntityId) -> bool {
        if self.creation_queue.contains(&entity) {
            return false;
        }
        self.creation_queue.push(entity);
        true
    }

    /// Queues an entity for deletion at the end of the frame.
    ///
    /// Returns `false`, with a warning, if it is already queued.
    pub fn queue_deletion(&mut self, entity: EntityId) -> bool {
        if self.is_queued_for_deletion(entity) {
            warn!(entity = ?entity, "entity already queued for deletion");
            return false;
        }
        self.deletion_queue.push(entity);
        true
    }

    /// Checks if an entity waits for deletion.
    #[must_use]
    pub fn is_queued_for_deletion(&self, entity: EntityId) -> bool {
        self.deletion_queue.contains(&entity)
    }

    /// Entities waiting for deletion, in queue order.
    #[must_use]
    pub fn queued_deletions(&self) -> &[EntityId] {
        &self.deletion_queue
    }

    /// Entities waiting for their start, in queue order.
    #[must_use]
    pub fn queued_creations(&self) -> &[EntityId] {
        &self.creation_queue
    }

    /// Queues a switch to the scene `name`, built by `build` at the end of
    /// the frame.
    ///
    /// Returns `false`, with a warning, if another scene is already queued;
    /// the first one wins.
    pub fn queue_scene_change<F>(&mut self, name: impl Into<String>, build: F) -> bool
    where
        F: FnOnce(&mut EngineContext) -> EngineResult<()> + 'static,
    {
        let name = name.into();
        if let Some(queued) = &self.queued_scene {
            warn!(queued = %queued.name, scene = %name, "scene already queued, not loading");
            return false;
        }
        self.queued_scene = Some(PendingScene {
            name,
            build: Box::new(build),
        });
        true
    }

    /// Name of the scene waiting to be loaded.
    #[must_use]
    pub fn queued_scene(&self) -> Option<&str> {
        self.queued_scene.as_ref().map(|scene| scene.name.as_str())
    }

    /// Name of the last scene loaded through a scene change.
    #[must_use]
    pub fn active_scene(&self) -> Option<&str> {
        self.active_scene.as_deref()
    }

    pub(crate) fn take_scene_change(&mut self) -> Option<(String, SceneBuilder)> {
        let scene = self.queued_scene.take()?;
        self.active_scene = Some(scene.name.clone());
        Some((scene.name, scene.build))
    }

    pub(crate) fn take_deletions(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.deletion_queue)
    }

    pub(crate) fn take_creations(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.creation_queue)
    }
}
