//! Capability predicates
//!
//! Compile-time checks used as trait bounds. Nothing in here exists at
//! runtime: a type either satisfies the predicate or the call does not
//! compile.
//!
//! - [`Callable`] / [`CallableMut`]: an operation invocable with an argument
//!   tuple, once or repeatedly
//! - [`Integral`], [`SignedIntegral`], [`UnsignedIntegral`],
//!   [`FloatingPoint`], [`Arithmetic`]: numeric categories
//! - [`Comparable`], [`Equatable`], [`Addable`], ...: operator support
//! - [`Iterable`]: can be iterated over

pub mod callable;
pub mod types;

pub use callable::{Callable, CallableMut};
pub use types::{
    Addable, Arithmetic, Comparable, Divisible, Equatable, FloatingPoint, Integral, Iterable,
    Multipliable, SameAs, SignedIntegral, Subtractable, UnsignedIntegral,
};
