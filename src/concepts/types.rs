//! Type category and operator predicates

use std::ops::{Add, Div, Mul, Sub};

mod sealed {
    pub trait Sealed {}
}

/// Satisfied by the built-in integer types.
pub trait Integral: sealed::Sealed + Copy + Ord + Eq + std::hash::Hash {
    /// Whether the type can hold negative values
    const SIGNED: bool;
}

/// Satisfied by the built-in signed integer types.
pub trait SignedIntegral: Integral {}

/// Satisfied by the built-in unsigned integer types.
pub trait UnsignedIntegral: Integral {}

/// Satisfied by `f32` and `f64`.
pub trait FloatingPoint: sealed::Sealed + Copy + PartialOrd {}

/// Satisfied by every integer and floating point type.
pub trait Arithmetic:
    sealed::Sealed
    + Copy
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
}

macro_rules! impl_integral {
    ($signed:expr => $($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}
            impl Integral for $ty {
                const SIGNED: bool = $signed;
            }
            impl Arithmetic for $ty {}
        )*
    };
}

impl_integral!(true => i8, i16, i32, i64, i128, isize);
impl_integral!(false => u8, u16, u32, u64, u128, usize);

impl SignedIntegral for i8 {}
impl SignedIntegral for i16 {}
impl SignedIntegral for i32 {}
impl SignedIntegral for i64 {}
impl SignedIntegral for i128 {}
impl SignedIntegral for isize {}

impl UnsignedIntegral for u8 {}
impl UnsignedIntegral for u16 {}
impl UnsignedIntegral for u32 {}
impl UnsignedIntegral for u64 {}
impl UnsignedIntegral for u128 {}
impl UnsignedIntegral for usize {}

impl sealed::Sealed for f32 {}
impl sealed::Sealed for f64 {}
impl FloatingPoint for f32 {}
impl FloatingPoint for f64 {}
impl Arithmetic for f32 {}
impl Arithmetic for f64 {}

/// `T + Rhs` is defined.
pub trait Addable<Rhs = Self>: Add<Rhs> {}
impl<T: Add<Rhs>, Rhs> Addable<Rhs> for T {}

/// `T - Rhs` is defined.
pub trait Subtractable<Rhs = Self>: Sub<Rhs> {}
impl<T: Sub<Rhs>, Rhs> Subtractable<Rhs> for T {}

/// `T * Rhs` is defined.
pub trait Multipliable<Rhs = Self>: Mul<Rhs> {}
impl<T: Mul<Rhs>, Rhs> Multipliable<Rhs> for T {}

/// `T / Rhs` is defined.
pub trait Divisible<Rhs = Self>: Div<Rhs> {}
impl<T: Div<Rhs>, Rhs> Divisible<Rhs> for T {}

/// `T == Rhs` is defined.
pub trait Equatable<Rhs: ?Sized = Self>: PartialEq<Rhs> {}
impl<T: PartialEq<Rhs> + ?Sized, Rhs: ?Sized> Equatable<Rhs> for T {}

/// `T < Rhs`, `T > Rhs` and friends are defined.
pub trait Comparable<Rhs: ?Sized = Self>: PartialOrd<Rhs> {}
impl<T: PartialOrd<Rhs> + ?Sized, Rhs: ?Sized> Comparable<Rhs> for T {}

/// The value can be iterated over.
pub trait Iterable: IntoIterator {}
impl<T: IntoIterator> Iterable for T {}

/// `Self` and `T` are the same type.
pub trait SameAs<T> {}
impl<T> SameAs<T> for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn largest<T: Arithmetic>(values: &[T]) -> Option<T> {
        values
            .iter()
            .copied()
            .fold(None, |best, v| match best {
                Some(b) if b >= v => Some(b),
                _ => Some(v),
            })
    }

    fn is_signed<T: Integral>(_: T) -> bool {
        T::SIGNED
    }

    fn count<I: Iterable>(items: I) -> usize {
        items.into_iter().count()
    }

    fn same<A: SameAs<B>, B>() {}

    fn sum<T: Addable<Output = T> + Copy>(a: T, b: T) -> T {
        a + b
    }

    #[test]
    fn test_integral_sign() {
        assert!(is_signed(-3i32));
        assert!(!is_signed(3u64));
        assert!(is_signed(0isize));
    }

    #[test]
    fn test_arithmetic_accepts_ints_and_floats() {
        assert_eq!(largest(&[3, 9, 1]), Some(9));
        assert_eq!(largest(&[0.5, -1.0]), Some(0.5));
        assert_eq!(largest::<u8>(&[]), None);
    }

    #[test]
    fn test_iterable() {
        assert_eq!(count(vec![1, 2, 3]), 3);
        assert_eq!(count("a-b".split('-')), 2);
    }

    #[test]
    fn test_operator_predicates() {
        assert_eq!(sum(2, 3), 5);
        assert_eq!(sum(String::from("x").len(), 1), 2);
        same::<u32, u32>();
    }
}
