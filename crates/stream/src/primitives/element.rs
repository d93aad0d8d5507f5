//! Element types accepted by the benchmark.
//!
//! ## Purpose
//!
//! Arrays are generic over a floating-point element type chosen at compile
//! time. [`StreamFloat`] restricts that parameter to `f32` and `f64` and adds
//! the two conversions the benchmark needs: widening into the `f64`
//! accumulator used by reductions and tolerance checks, and narrowing back.
//!
//! ## Invariants
//!
//! * Only `f32` and `f64` implement [`StreamFloat`] (the trait is sealed).
//! * `narrow(widen(x)) == x` for every finite `x`.

// External dependencies
use core::fmt::{Debug, Display};
use num_traits::Float;

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Floating-point element type of the three benchmark arrays.
pub trait StreamFloat:
    Float + Send + Sync + Debug + Display + Default + 'static + sealed::Sealed
{
    /// Precision label used in reports (`"float"` or `"double"`).
    const PRECISION: &'static str;

    /// Convert into the `f64` accumulator.
    fn widen(self) -> f64;

    /// Convert from the `f64` accumulator, rounding to nearest.
    fn narrow(value: f64) -> Self;
}

impl StreamFloat for f32 {
    const PRECISION: &'static str = "float";

    #[inline]
    fn widen(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn narrow(value: f64) -> Self {
        value as f32
    }
}

impl StreamFloat for f64 {
    const PRECISION: &'static str = "double";

    #[inline]
    fn widen(self) -> f64 {
        self
    }

    #[inline]
    fn narrow(value: f64) -> Self {
        value
    }
}

// ============================================================================
// Benchmark Constants
// ============================================================================

/// Initial value of every element of `a`.
pub const START_A: f64 = 0.1;

/// Initial value of every element of `b`.
pub const START_B: f64 = 0.2;

/// Initial value of every element of `c`.
pub const START_C: f64 = 0.0;

/// Scalar used by `mul`, `triad` and `nstream`.
pub const START_SCALAR: f64 = 0.4;

/// Default number of elements per array (2^25).
pub const DEFAULT_ARRAY_SIZE: usize = 33_554_432;

/// Default number of repetitions of each kernel.
pub const DEFAULT_REPETITIONS: usize = 100;
