//! # ECS World
//!
//! The container for all entities and their components.
//!
//! The world owns the component storage table and the entity signature
//! registry. It records every signature change so a
//! [`Scheduler`](super::Scheduler) can bring system membership up to date.

use tracing::debug;

use super::component::{Component, ComponentInfo, ComponentType, ComponentTypeId};
use super::entity::{Entity, EntityId};
use super::signature::{Signature, MAX_COMPONENT_TYPES};
use super::storage::{AnyStorage, ComponentStorage};
use crate::error::{EcsError, EcsResult};

/// Default entity capacity.
pub const DEFAULT_MAX_ENTITIES: usize = 1000;

/// Sizing limits for a [`World`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    /// Maximum number of simultaneously live entities.
    pub max_entities: usize,
    /// Maximum number of registered component types (at most 64).
    pub max_component_types: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            max_component_types: MAX_COMPONENT_TYPES,
        }
    }
}

/// Access to the world from a scheduler context.
///
/// The scheduler is generic over the context handed to system callbacks;
/// it only needs to reach the world inside it.
pub trait EcsContext {
    /// Shared access to the world.
    fn world(&self) -> &World;

    /// Exclusive access to the world.
    fn world_mut(&mut self) -> &mut World;
}

/// The ECS World - container for entities and components.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new(WorldConfig::default());
/// let transforms = world.register_component_type::<Transform2D>()?;
///
/// let entity = world.create_entity()?;
/// world.set_component(entity, transforms, Transform2D::default())?;
/// assert!(world.get_component(entity, transforms).is_some());
/// ```
pub struct World {
    /// Entity slots, grown on demand up to the configured capacity.
    entities: Vec<Entity>,
    /// Free list of entity indices for reuse.
    free_indices: Vec<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
    /// Sizing limits.
    config: WorldConfig,
    /// Registered component types, indexed by id.
    components: Vec<ComponentInfo>,
    /// One storage per registered component type, indexed by id.
    storages: Vec<Box<dyn AnyStorage>>,
    /// Entities whose signature changed since the last drain.
    signature_changes: Vec<EntityId>,
}

impl World {
    /// Creates a new, empty world.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        let config = WorldConfig {
            max_component_types: config.max_component_types.min(MAX_COMPONENT_TYPES),
            ..config
        };
        Self {
            entities: Vec::with_capacity(config.max_entities),
            free_indices: Vec::with_capacity(config.max_entities),
            alive_count: 0,
            config,
            components: Vec::with_capacity(config.max_component_types),
            storages: Vec::with_capacity(config.max_component_types),
            signature_changes: Vec::new(),
        }
    }

    /// Returns the sizing limits of this world.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> WorldConfig {
        self.config
    }

    // =========================================================================
    // Component registration
    // =========================================================================

    /// Registers a component type and assigns it the next signature bit.
    ///
    /// # Errors
    ///
    /// - [`EcsError::TooManyComponentTypes`] if the configured maximum is reached
    /// - [`EcsError::DuplicateComponentType`] if `T` is already registered
    pub fn register_component_type<T: Component>(&mut self) -> EcsResult<ComponentType<T>> {
        if self.components.iter().any(ComponentInfo::is::<T>) {
            return Err(EcsError::DuplicateComponentType(std::any::type_name::<T>()));
        }
        if self.components.len() >= self.config.max_component_types {
            return Err(EcsError::TooManyComponentTypes {
                limit: self.config.max_component_types,
            });
        }

        // Bounded by MAX_COMPONENT_TYPES above, so the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation)]
        let id = ComponentTypeId::new(self.components.len() as u8);
        let info = ComponentInfo::of::<T>(id);
        debug!(component = info.name, id = id.index(), "registered component type");

        self.components.push(info);
        self.storages
            .push(Box::new(ComponentStorage::<T>::new(self.config.max_entities)));
        Ok(ComponentType::new(id))
    }

    /// Looks up the handle of an already registered type.
    ///
    /// This scans the registration table; resolve handles once at startup
    /// and keep them.
    #[must_use]
    pub fn component_type<T: Component>(&self) -> Option<ComponentType<T>> {
        self.components
            .iter()
            .find(|info| info.is::<T>())
            .map(|info| ComponentType::new(info.id))
    }

    /// Returns the registration record for a component id.
    #[must_use]
    pub fn component_info(&self, id: ComponentTypeId) -> Option<&ComponentInfo> {
        self.components.get(usize::from(id.index()))
    }

    /// Returns the number of registered component types.
    #[inline]
    #[must_use]
    pub fn component_type_count(&self) -> usize {
        self.components.len()
    }

    // =========================================================================
    // Entity lifecycle
    // =========================================================================

    /// Returns the maximum number of live entities.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.config.max_entities
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Allocates a new entity id, reusing freed slots first.
    ///
    /// The entity has no components and therefore belongs to no system.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::EntityCapacityExceeded`] when every slot is live.
    pub fn create_entity(&mut self) -> EcsResult<EntityId> {
        if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.entities[index as usize];
            // Increment generation to invalidate old references
            let id = EntityId::new(index, slot.id.generation().wrapping_add(1));
            *slot = Entity::new(id);
            self.alive_count += 1;
            return Ok(id);
        }

        if self.entities.len() >= self.config.max_entities {
            return Err(EcsError::EntityCapacityExceeded {
                capacity: self.config.max_entities,
            });
        }

        let index = u32::try_from(self.entities.len()).map_err(|_| {
            EcsError::EntityCapacityExceeded {
                capacity: self.config.max_entities,
            }
        })?;
        let id = EntityId::new(index, 0);
        self.entities.push(Entity::new(id));
        self.alive_count += 1;
        Ok(id)
    }

    /// Removes every component of an entity and frees its id for reuse.
    ///
    /// # Returns
    ///
    /// `true` if the entity was destroyed, `false` if it was already dead
    /// or the ID was stale.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }

        self.remove_all_components(id);

        let slot = &mut self.entities[id.index() as usize];
        slot.alive = false;
        self.alive_count -= 1;
        self.free_indices.push(id.index());
        // A destroyed entity must leave every system, even one requiring
        // the empty signature.
        self.signature_changes.push(id);
        true
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        if id.is_null() {
            return false;
        }
        self.entities
            .get(id.index() as usize)
            .is_some_and(|e| e.alive && e.id.generation() == id.generation())
    }

    /// Gets an entity slot by ID.
    ///
    /// # Returns
    ///
    /// Reference to the entity, or None if not found/dead/stale.
    #[inline]
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        if !self.is_alive(id) {
            return None;
        }
        Some(&self.entities[id.index() as usize])
    }

    /// Returns the signature of a live entity.
    #[inline]
    #[must_use]
    pub fn signature(&self, id: EntityId) -> Option<Signature> {
        self.entity(id).map(|e| e.signature)
    }

    /// Iterates over all alive entities in index order.
    pub fn iter_alive(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.alive)
    }

    // =========================================================================
    // Component access
    // =========================================================================

    /// Stores a component on an entity, overwriting any previous value.
    ///
    /// # Returns
    ///
    /// The previous value, if the entity already had one.
    ///
    /// # Errors
    ///
    /// - [`EcsError::DeadEntity`] if the entity is not alive
    /// - [`EcsError::UnregisteredComponentType`] if the handle belongs to another world
    pub fn set_component<T: Component>(
        &mut self,
        entity: EntityId,
        ty: ComponentType<T>,
        value: T,
    ) -> EcsResult<Option<T>> {
        if !self.is_alive(entity) {
            return Err(EcsError::DeadEntity(entity));
        }
        let storage = self
            .storage_mut(ty)
            .ok_or(EcsError::UnregisteredComponentType(std::any::type_name::<T>()))?;
        let previous = storage.set(entity.index() as usize, value);

        if previous.is_none() {
            self.entities[entity.index() as usize].signature.insert(ty.id());
            self.signature_changes.push(entity);
        }
        Ok(previous)
    }

    /// Gets a component of an entity.
    ///
    /// Returns `None` if the entity lacks the component; this is an expected
    /// condition, not an error.
    #[inline]
    #[must_use]
    pub fn get_component<T: Component>(&self, entity: EntityId, ty: ComponentType<T>) -> Option<&T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.storage(ty)?.get(entity.index() as usize)
    }

    /// Gets a mutable component of an entity.
    #[inline]
    pub fn get_component_mut<T: Component>(
        &mut self,
        entity: EntityId,
        ty: ComponentType<T>,
    ) -> Option<&mut T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.storage_mut(ty)?.get_mut(entity.index() as usize)
    }

    /// Checks if an entity has a component of the given type.
    #[inline]
    #[must_use]
    pub fn has_component(&self, entity: EntityId, id: ComponentTypeId) -> bool {
        self.signature(entity).is_some_and(|sig| sig.contains(id))
    }

    /// Removes a component from an entity and clears its signature bit.
    ///
    /// # Returns
    ///
    /// The removed value, or `None` if the entity did not have one.
    pub fn remove_component<T: Component>(
        &mut self,
        entity: EntityId,
        ty: ComponentType<T>,
    ) -> Option<T> {
        if !self.is_alive(entity) {
            return None;
        }
        let removed = self.storage_mut(ty)?.take(entity.index() as usize)?;
        self.entities[entity.index() as usize].signature.remove(ty.id());
        self.signature_changes.push(entity);
        Some(removed)
    }

    /// Removes every component of an entity, leaving it alive but empty.
    pub fn remove_all_components(&mut self, entity: EntityId) {
        let Some(signature) = self.signature(entity) else {
            return;
        };
        if signature.is_empty() {
            return;
        }

        let index = entity.index() as usize;
        for info in &self.components {
            if signature.contains(info.id) {
                let storage = &mut self.storages[usize::from(info.id.index())];
                debug_assert!(storage.contains(index), "signature out of sync with storage");
                storage.remove(index);
            }
        }
        self.entities[index].signature = Signature::EMPTY;
        self.signature_changes.push(entity);
    }

    /// Returns the storage for a component type, for bulk iteration.
    #[must_use]
    pub fn storage<T: Component>(&self, ty: ComponentType<T>) -> Option<&ComponentStorage<T>> {
        self.storages
            .get(usize::from(ty.id().index()))?
            .as_any()
            .downcast_ref::<ComponentStorage<T>>()
    }

    /// Returns the mutable storage for a component type.
    pub fn storage_mut<T: Component>(
        &mut self,
        ty: ComponentType<T>,
    ) -> Option<&mut ComponentStorage<T>> {
        self.storages
            .get_mut(usize::from(ty.id().index()))?
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
    }

    // =========================================================================
    // Signature change propagation
    // =========================================================================

    /// Checks if any signature changed since the last drain.
    #[inline]
    #[must_use]
    pub fn has_signature_changes(&self) -> bool {
        !self.signature_changes.is_empty()
    }

    /// Moves the recorded signature changes into `out`, in the order they
    /// happened.
    pub fn drain_signature_changes(&mut self, out: &mut Vec<EntityId>) {
        out.append(&mut self.signature_changes);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl EcsContext for World {
    fn world(&self) -> &World {
        self
    }

    fn world_mut(&mut self) -> &mut World {
        self
    }
}
