use num_traits::{One, PrimInt};

/// Trait implemented by flag enums declared with [`define_bitmask_flags!`].
///
/// The enum's discriminant (via `#[repr(u8)]`) determines the bit index. The backing integer
/// type is chosen through `Storage`.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: `bit_index()` must be < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A compact set of flags.
///
/// Deliberately not a SpacetimeDB type: the server stores the raw `bits` and wraps them back
/// up at the boundary.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    pub fn from_flags<U: FlagBitmask<Storage = T> + Copy>(flags: &[U]) -> Self {
        let mut out = Self::new(T::zero());
        for &flag in flags {
            out.add(flag);
        }
        out
    }

    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits | flag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits & !flag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, flag: U) -> bool {
        (self.bits & flag.mask()) != T::zero()
    }

    pub fn has_any<U: FlagBitmask<Storage = T> + Copy>(&self, flags: &[U]) -> bool {
        let combined = flags.iter().fold(T::zero(), |acc, f| acc | f.mask());
        (self.bits & combined) != T::zero()
    }

    /// Union of two sets, used when several input samples fold into one tick.
    pub fn union(self, other: Self) -> Self {
        Self::new(self.bits | other.bits)
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }

    pub fn clear(&mut self) {
        self.bits = T::zero();
    }
}

/// Declare a bitmask-backed enum and implement `FlagBitmask` for it.
///
/// Example:
/// ```text
/// define_bitmask_flags!(MoveButton, u8, {
///     Jump,
///     Magnetize,
///     Boost,
/// });
/// ```
#[macro_export]
macro_rules! define_bitmask_flags {
    ($name:ident, $storage:ty, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl $crate::bitmask_flags::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    define_bitmask_flags!(TestFlag, u8, { A, B, C });

    #[test]
    fn add_remove_and_query() {
        let mut flags = BitmaskFlags::<u8>::default();
        assert!(flags.is_empty());

        flags.add(TestFlag::B);
        assert!(flags.has(TestFlag::B));
        assert!(!flags.has(TestFlag::A));
        assert_eq!(flags.bits, 0b010);

        flags.remove(TestFlag::B);
        assert!(flags.is_empty());
    }

    #[test]
    fn union_keeps_flags_from_both_sides() {
        let a = BitmaskFlags::from_flags(&[TestFlag::A]);
        let c = BitmaskFlags::from_flags(&[TestFlag::C]);
        let both = a.union(c);
        assert!(both.has(TestFlag::A));
        assert!(both.has(TestFlag::C));
        assert!(!both.has(TestFlag::B));
        assert!(both.has_any(&[TestFlag::B, TestFlag::C]));
    }
}
