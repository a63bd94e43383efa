//! Provides [`Offset`], the integer type used to address an arena.
use core::{fmt, hash::Hash, ops};

/// An unsigned integer type usable as an arena offset and block size.
///
/// This trait is sealed and implemented for `u8`, `u16`, `u32`, `u64`, and
/// `usize`. A narrower type makes the indices smaller at the cost of a
/// smaller maximum capacity.
pub trait Offset:
    'static
    + Copy
    + Clone
    + Eq
    + Ord
    + Hash
    + fmt::Debug
    + fmt::Display
    + fmt::LowerHex
    + ops::Add<Output = Self>
    + ops::Sub<Output = Self>
    + ops::AddAssign
    + ops::SubAssign
    + private::Sealed
{
    const ZERO: Self;
    const MAX: Self;

    /// `self + rhs`, or `None` on overflow.
    fn checked_add(self, rhs: Self) -> Option<Self>;
}

mod private {
    pub trait Sealed {}
}

macro_rules! impl_offset {
    ($type:ty) => {
        impl private::Sealed for $type {}

        impl Offset for $type {
            const ZERO: Self = 0;
            const MAX: Self = <$type>::MAX;

            #[inline]
            fn checked_add(self, rhs: Self) -> Option<Self> {
                <$type>::checked_add(self, rhs)
            }
        }
    };
}

impl_offset!(u8);
impl_offset!(u16);
impl_offset!(u32);
impl_offset!(u64);
impl_offset!(usize);

#[cfg(test)]
mod tests {
    use super::*;

    fn sum<T: Offset>(x: T, y: T) -> Option<T> {
        x.checked_add(y)
    }

    #[test]
    fn checked_add_overflow() {
        assert_eq!(sum(200u8, 55), Some(255));
        assert_eq!(sum(200u8, 56), None);
        assert_eq!(sum(usize::MAX, 0), Some(usize::MAX));
        assert_eq!(sum(u64::MAX, 1), None);
    }
}
