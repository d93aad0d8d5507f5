//! Validation of benchmark configuration.
//!
//! ## Purpose
//!
//! This module checks a benchmark configuration before any memory is
//! allocated: array size, repetition count, kernel selection and the
//! numeric parameters.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Cheap**: No check touches array memory.
//!
//! ## Invariants
//!
//! * A validated configuration allocates `3 * N * size_of::<T>()` bytes
//!   without overflowing `usize`.
//! * The kernel plan of a validated configuration has a representable length.
//! * Validation logic is deterministic and side-effect free.
//!
//! ## Non-goals
//!
//! * This module does not probe for available memory or devices.

// External dependencies
use core::mem::size_of;

// Internal dependencies
use crate::algorithms::kernels::Kernel;
use crate::primitives::element::StreamFloat;
use crate::primitives::errors::StreamError;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for benchmark configuration.
///
/// Provides static methods that return `Result<(), StreamError>` and fail
/// fast upon the first violation.
pub struct Validator;

impl Validator {
    /// Validate the array size for element type `T`.
    pub fn validate_array_size<T: StreamFloat>(array_size: usize) -> Result<(), StreamError> {
        let total = array_size
            .checked_mul(size_of::<T>())
            .and_then(|bytes| bytes.checked_mul(3));
        if array_size == 0 || total.is_none_or(|bytes| bytes > isize::MAX as usize) {
            return Err(StreamError::InvalidArraySize(array_size));
        }
        Ok(())
    }

    /// Validate the repetition count for `kernel_count` selected kernels.
    ///
    /// The run keeps one plan entry and one timing per kernel call, so the
    /// total number of calls must fit that bookkeeping in memory.
    pub fn validate_repetitions(
        repetitions: usize,
        kernel_count: usize,
    ) -> Result<(), StreamError> {
        let per_call = size_of::<Kernel>() + size_of::<f64>();
        let bookkeeping = kernel_count
            .max(1)
            .checked_mul(repetitions)
            .and_then(|calls| calls.checked_mul(per_call));
        if repetitions == 0 || bookkeeping.is_none_or(|bytes| bytes > isize::MAX as usize) {
            return Err(StreamError::InvalidRepetitions(repetitions));
        }
        Ok(())
    }

    /// Validate a resolved kernel list: non-empty and duplicate-free.
    pub fn validate_kernels(kernels: &[Kernel]) -> Result<(), StreamError> {
        if kernels.is_empty() {
            return Err(StreamError::EmptyKernelSelection);
        }
        for (i, kernel) in kernels.iter().enumerate() {
            if kernels[..i].contains(kernel) {
                return Err(StreamError::DuplicateKernel(kernel.name()));
            }
        }
        Ok(())
    }

    /// Validate a single numeric value for finiteness.
    pub fn validate_scalar<T: StreamFloat>(val: T, name: &str) -> Result<(), StreamError> {
        if !val.is_finite() {
            return Err(StreamError::InvalidNumericValue(format!("{name}={val}")));
        }
        Ok(())
    }

    /// Validate a worker thread count.
    pub fn validate_threads(threads: Option<usize>) -> Result<(), StreamError> {
        if threads == Some(0) {
            return Err(StreamError::InvalidInput(
                "thread count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate that no parameters were set multiple times in the builder.
    pub fn validate_no_duplicates(
        duplicate_param: Option<&'static str>,
    ) -> Result<(), StreamError> {
        if let Some(param) = duplicate_param {
            return Err(StreamError::DuplicateParameter { parameter: param });
        }
        Ok(())
    }
}
