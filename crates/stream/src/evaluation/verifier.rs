//! Post-run correctness verification.
//!
//! ## Purpose
//!
//! This module checks the final state of a backend against analytically
//! expected values. Because every element of an array receives the same
//! sequence of operations, the expected state is computed by replaying the
//! executed kernel plan on three scalars.
//!
//! ## Design notes
//!
//! * **Replay, not recompute**: The verifier is given the exact plan the
//!   driver executed, so repeated application (`nstream`) and ordering
//!   (`Schedule`) are accounted for.
//! * **Same arithmetic**: The replay evaluates the same expressions in `T`
//!   that conforming backends evaluate.
//! * **Attribution**: Each array remembers the last kernel that wrote it, so
//!   a mismatch in `c` after `add` is reported against `add`.
//!
//! ## Tolerance policy
//!
//! * Array elements: `|observed - expected| <= (100 + U) * eps(T) * max(|expected|, 1)`,
//!   where U is the number of `nstream` updates in the plan. The replay uses
//!   the same expressions as the kernels, so repetitions of the other kernels
//!   do not widen the bound: the classic cycle contracts by `0.96` per pass
//!   and any per-call rounding difference decays instead of accumulating.
//!   `nstream` adds to its own output, so a backend that fuses its
//!   multiply-add (the GPU in `f32`) may drift by one rounding per update.
//! * Dot product: `|observed - expected| <= (100 * eps(T) + N * eps(f64)) * max(|expected|, 1)`.
//!   The reduction order and accumulator width are backend-defined; the
//!   `N * eps(f64)` term bounds rounding growth of an `f64` accumulator over
//!   N terms, the `100 * eps(T)` term covers the final rounding to `T` and
//!   per-term products computed in `T`.
//!
//! ## Invariants
//!
//! * Verification never mutates the array store and never retries.
//! * The first failing element (in index order, arrays checked a, b, c) is reported.

// External dependencies
use tracing::error;

// Internal dependencies
use crate::algorithms::kernels::{ArrayId, Kernel};
use crate::primitives::element::{START_A, START_B, START_C, StreamFloat};
use crate::primitives::errors::{Location, StreamError};

/// Name reported for an array never written by a kernel.
const INIT_WRITER: &str = "init_arrays";

// ============================================================================
// Initial Values
// ============================================================================

/// Fill values passed to `init_arrays`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitValues<T> {
    /// Initial value of `a`.
    pub a: T,
    /// Initial value of `b`.
    pub b: T,
    /// Initial value of `c`.
    pub c: T,
}

impl<T: StreamFloat> Default for InitValues<T> {
    fn default() -> Self {
        Self {
            a: T::narrow(START_A),
            b: T::narrow(START_B),
            c: T::narrow(START_C),
        }
    }
}

// ============================================================================
// Expected State
// ============================================================================

/// Expected final state after a kernel plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpectedState<T> {
    /// Expected value of every element of `a`.
    pub a: T,
    /// Expected value of every element of `b`.
    pub b: T,
    /// Expected value of every element of `c`.
    pub c: T,
    /// Expected value of the last dot product, if the plan ran one.
    pub dot: Option<f64>,
    /// Last kernel that wrote `a`, `b`, `c` respectively.
    pub writers: [&'static str; 3],
    /// Number of `nstream` updates folded into `a`.
    pub nstream_updates: usize,
}

impl<T> ExpectedState<T> {
    fn writer(&self, array: ArrayId) -> &'static str {
        match array {
            ArrayId::A => self.writers[0],
            ArrayId::B => self.writers[1],
            ArrayId::C => self.writers[2],
        }
    }
}

// ============================================================================
// Verifier
// ============================================================================

/// Analytic checker for backend results.
#[derive(Debug, Clone, Copy)]
pub struct Verifier<T> {
    init: InitValues<T>,
    scalar: T,
    array_size: usize,
}

impl<T: StreamFloat> Verifier<T> {
    /// Create a verifier for arrays of `array_size` elements.
    pub fn new(init: InitValues<T>, scalar: T, array_size: usize) -> Self {
        Self {
            init,
            scalar,
            array_size,
        }
    }

    /// Replay `plan` on scalars to obtain the expected final state.
    pub fn expected(&self, plan: &[Kernel]) -> ExpectedState<T> {
        let scalar = self.scalar;
        let n = self.array_size as f64;
        let mut state = ExpectedState {
            a: self.init.a,
            b: self.init.b,
            c: self.init.c,
            dot: None,
            writers: [INIT_WRITER; 3],
            nstream_updates: 0,
        };

        for &kernel in plan {
            match kernel {
                Kernel::Copy => state.c = state.a,
                Kernel::Mul => state.b = scalar * state.c,
                Kernel::Add => state.c = state.a + state.b,
                Kernel::Triad => state.a = state.b + scalar * state.c,
                Kernel::Nstream => {
                    state.a = state.a + state.b + scalar * state.c;
                    state.nstream_updates += 1;
                }
                Kernel::Dot => state.dot = Some((state.a * state.b).widen() * n),
            }
            match kernel.writes() {
                Some(ArrayId::A) => state.writers[0] = kernel.name(),
                Some(ArrayId::B) => state.writers[1] = kernel.name(),
                Some(ArrayId::C) => state.writers[2] = kernel.name(),
                None => {}
            }
        }

        state
    }

    /// Relative-or-absolute tolerance for array elements.
    pub fn element_tolerance() -> f64 {
        T::epsilon().widen() * 100.0
    }

    /// Element tolerance widened by one rounding per `nstream` update.
    pub fn array_tolerance(expected: &ExpectedState<T>) -> f64 {
        Self::element_tolerance() + T::epsilon().widen() * expected.nstream_updates as f64
    }

    /// Relative-or-absolute tolerance for the dot product over N terms.
    pub fn reduction_tolerance(&self) -> f64 {
        Self::element_tolerance() + self.array_size as f64 * f64::EPSILON
    }

    /// Check all three arrays against the expected state.
    pub fn verify_arrays(
        &self,
        expected: &ExpectedState<T>,
        a: &[T],
        b: &[T],
        c: &[T],
    ) -> Result<(), StreamError> {
        let tol = Self::array_tolerance(expected);
        for (array, values, gold) in [
            (ArrayId::A, a, expected.a),
            (ArrayId::B, b, expected.b),
            (ArrayId::C, c, expected.c),
        ] {
            if values.len() != self.array_size {
                return Err(StreamError::SizeMismatch {
                    array: array.name(),
                    expected: self.array_size,
                    got: values.len(),
                });
            }

            let gold = gold.widen();
            if let Some(idx) = values
                .iter()
                .position(|v| !within_tolerance(gold, v.widen(), tol))
            {
                return Err(self.mismatch(
                    expected.writer(array),
                    Location::Element(idx),
                    gold,
                    values[idx].widen(),
                ));
            }
        }
        Ok(())
    }

    /// Check the last dot product against the expected state.
    pub fn verify_dot(
        &self,
        expected: &ExpectedState<T>,
        observed: Option<T>,
    ) -> Result<(), StreamError> {
        let Some(gold) = expected.dot else {
            return Ok(());
        };
        let observed = observed.map_or(f64::NAN, StreamFloat::widen);

        if !within_tolerance(gold, observed, self.reduction_tolerance()) {
            return Err(self.mismatch(Kernel::Dot.name(), Location::Reduction, gold, observed));
        }
        Ok(())
    }

    /// Replay `plan` and check both the arrays and the last dot product.
    pub fn verify(
        &self,
        plan: &[Kernel],
        a: &[T],
        b: &[T],
        c: &[T],
        dot: Option<T>,
    ) -> Result<(), StreamError> {
        let expected = self.expected(plan);
        self.verify_arrays(&expected, a, b, c)?;
        self.verify_dot(&expected, dot)
    }

    fn mismatch(
        &self,
        kernel: &'static str,
        location: Location,
        expected: f64,
        observed: f64,
    ) -> StreamError {
        error!(kernel, %location, expected, observed, "verification failed");
        StreamError::Verification {
            kernel,
            location,
            expected,
            observed,
        }
    }
}

/// `|observed - expected| <= tol * max(|expected|, 1)`; NaN never passes.
pub fn within_tolerance(expected: f64, observed: f64, tol: f64) -> bool {
    (observed - expected).abs() <= tol * expected.abs().max(1.0)
}
