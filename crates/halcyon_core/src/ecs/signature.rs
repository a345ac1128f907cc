//! # Component Signatures
//!
//! A signature is a fixed-width bitset with one bit per registered
//! component type. Entities carry the set they currently hold; systems carry
//! the set they require.

use super::component::ComponentTypeId;

/// Number of bits in a signature, and therefore the hard ceiling on
/// registered component types.
pub const MAX_COMPONENT_TYPES: usize = 64;

/// Bitset of component types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Signature(u64);

impl Signature {
    /// The empty signature. Every entity matches a system requiring it.
    pub const EMPTY: Self = Self(0);

    /// Creates a signature from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Builds a signature from a list of component type ids.
    #[must_use]
    pub fn of(types: &[ComponentTypeId]) -> Self {
        types.iter().fold(Self::EMPTY, |sig, id| sig.with(*id))
    }

    /// Returns a copy with the bit for `id` set.
    #[inline]
    #[must_use]
    pub const fn with(self, id: ComponentTypeId) -> Self {
        Self(self.0 | (1 << id.index()))
    }

    /// Sets the bit for `id`.
    #[inline]
    pub fn insert(&mut self, id: ComponentTypeId) {
        self.0 |= 1 << id.index();
    }

    /// Clears the bit for `id`.
    #[inline]
    pub fn remove(&mut self, id: ComponentTypeId) {
        self.0 &= !(1 << id.index());
    }

    /// Checks if the bit for `id` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, id: ComponentTypeId) -> bool {
        (self.0 & (1 << id.index())) != 0
    }

    /// Checks if every bit of `required` is also set here.
    ///
    /// This is the system membership test:
    /// `(entity_signature & system_signature) == system_signature`.
    #[inline]
    #[must_use]
    pub const fn satisfies(self, required: Signature) -> bool {
        (self.0 & required.0) == required.0
    }

    /// Checks if no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of component types in the set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }
}

impl std::ops::BitOr for Signature {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
