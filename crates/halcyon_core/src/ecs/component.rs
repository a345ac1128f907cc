//! # Component Types
//!
//! Components are plain data records owned by exactly one entity.
//! Each Rust type is registered once per world and receives a small integer
//! id, which is its bit position in every [`Signature`](super::Signature)
//! and its slot in the world's storage table.

use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

/// Marker trait for ECS components.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug, Default)]
/// struct Health {
///     current: u32,
/// }
///
/// impl Component for Health {}
///
/// let health = world.register_component_type::<Health>()?;
/// world.set_component(entity, health, Health { current: 10 });
/// ```
pub trait Component: 'static {}

/// Untyped id issued by component registration (0-63).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ComponentTypeId(u8);

impl ComponentTypeId {
    /// Creates an id from its bit position.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in a signature.
    #[inline]
    #[must_use]
    pub const fn new(index: u8) -> Self {
        assert!(index < 64, "component type index out of signature range");
        Self(index)
    }

    /// Returns the bit position of this type.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }
}

/// Typed handle for a registered component type.
///
/// Carries the registration id plus the Rust type, so lookups are a direct
/// array index and a downcast with no hashing.
pub struct ComponentType<T> {
    id: ComponentTypeId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ComponentType<T> {
    pub(crate) const fn new(id: ComponentTypeId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the untyped id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> ComponentTypeId {
        self.id
    }
}

impl<T> Clone for ComponentType<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ComponentType<T> {}

impl<T> PartialEq for ComponentType<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for ComponentType<T> {}

impl<T> fmt::Debug for ComponentType<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentType")
            .field(&std::any::type_name::<T>())
            .field(&self.id.0)
            .finish()
    }
}

/// Registration record for one component type.
#[derive(Clone, Debug)]
pub struct ComponentInfo {
    /// The issued id.
    pub id: ComponentTypeId,
    /// Rust type name, for diagnostics.
    pub name: &'static str,
    rust_type: TypeId,
}

impl ComponentInfo {
    pub(crate) fn of<T: Component>(id: ComponentTypeId) -> Self {
        Self {
            id,
            name: std::any::type_name::<T>(),
            rust_type: TypeId::of::<T>(),
        }
    }

    pub(crate) fn is<T: Component>(&self) -> bool {
        self.rust_type == TypeId::of::<T>()
    }
}
