//! # Component Storage
//!
//! Dense, direct-indexed component storage.
//!
//! The storage uses a dense array strategy:
//! - Slots are indexed by entity index, pre-allocated up to the world capacity
//! - Access is O(1) via entity index
//! - Iteration is cache-friendly (contiguous memory)

use std::any::Any;

use super::component::Component;

/// Storage for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
///
/// # Example
///
/// ```rust,ignore
/// let mut storage: ComponentStorage<Transform2D> = ComponentStorage::new(1000);
/// storage.set(0, Transform2D::default());
/// ```
pub struct ComponentStorage<C: Component> {
    /// One slot per entity index.
    data: Vec<Option<C>>,
    /// Number of occupied slots.
    len: usize,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates new component storage with the specified capacity.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of entity slots to pre-allocate
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let mut data = Vec::with_capacity(capacity);
        data.resize_with(capacity, || None);
        Self { data, len: 0 }
    }

    /// Returns the number of stored components.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if no component is stored.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Gets a component by entity index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&C> {
        self.data.get(index).and_then(Option::as_ref)
    }

    /// Gets a mutable component by entity index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.data.get_mut(index).and_then(Option::as_mut)
    }

    /// Stores a component at the specified index, overwriting any previous
    /// value. The slot table grows if the index is past its end.
    ///
    /// # Returns
    ///
    /// The previous value, if there was one.
    #[inline]
    pub fn set(&mut self, index: usize, component: C) -> Option<C> {
        if index >= self.data.len() {
            self.data.resize_with(index + 1, || None);
        }
        let previous = self.data[index].replace(component);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Removes the component at the specified index.
    #[inline]
    pub fn take(&mut self, index: usize) -> Option<C> {
        let previous = self.data.get_mut(index).and_then(Option::take);
        if previous.is_some() {
            self.len -= 1;
        }
        previous
    }

    /// Iterates over all occupied slots with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &C)> {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|c| (index, c)))
    }

    /// Iterates mutably over all occupied slots with their indices.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut C)> {
        self.data
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_mut().map(|c| (index, c)))
    }
}

/// Type-erased view of a [`ComponentStorage`], used by the world's storage
/// table for operations that do not need the concrete type.
pub(crate) trait AnyStorage: Any {
    /// Drops the component at `index`, returning whether one was present.
    fn remove(&mut self, index: usize) -> bool;

    /// Checks if a component is present at `index`.
    fn contains(&self, index: usize) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> AnyStorage for ComponentStorage<C> {
    fn remove(&mut self, index: usize) -> bool {
        self.take(index).is_some()
    }

    fn contains(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker(u32);

    impl Component for Marker {}

    #[test]
    fn test_storage_get_set() {
        let mut storage: ComponentStorage<Marker> = ComponentStorage::new(100);

        assert!(storage.set(50, Marker(7)).is_none());
        assert_eq!(storage.get(50), Some(&Marker(7)));
        assert_eq!(storage.set(50, Marker(8)), Some(Marker(7)));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_storage_grows_past_capacity() {
        let mut storage: ComponentStorage<Marker> = ComponentStorage::new(4);
        storage.set(10, Marker(1));
        assert_eq!(storage.get(10), Some(&Marker(1)));
        assert!(storage.get(9).is_none());
        assert!(storage.get(100).is_none());
    }

    #[test]
    fn test_storage_take() {
        let mut storage: ComponentStorage<Marker> = ComponentStorage::new(4);
        storage.set(1, Marker(1));
        assert_eq!(storage.take(1), Some(Marker(1)));
        assert!(storage.take(1).is_none());
        assert!(storage.is_empty());
    }
}
