//! Error types for stream benchmark operations.
//!
//! ## Purpose
//!
//! This module defines every error condition a benchmark run can hit:
//! configuration validation, buffer allocation, device selection, host
//! readback, device failures during a kernel, and post-run verification.
//!
//! ## Design notes
//!
//! * **Contextual**: Errors carry the values needed for a diagnostic
//!   (array name, requested bytes, expected vs. observed values).
//! * **Classified**: [`StreamError::is_fatal`] separates errors that abort a
//!   run from errors reported back to the caller.
//! * **Exit status**: [`StreamError::exit_code`] is non-zero for every variant.
//!
//! ## Key concepts
//!
//! 1. **Configuration**: Invalid array size, repetitions, kernel selection.
//! 2. **Construction**: `AllocationError` and `DeviceUnavailable`.
//! 3. **Readback**: `SizeMismatch` when a host buffer has the wrong length.
//! 4. **Verification**: `VerificationError` naming kernel, location, values.
//!
//! ## Invariants
//!
//! * All variants provide sufficient context for a human-readable message.
//! * Numeric values in verification errors are widened to `f64`.
//!
//! ## Non-goals
//!
//! * This module does not perform the checks itself.
//! * This module does not retry or recover from failures.

// External dependencies
use core::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;

// ============================================================================
// Verification Location
// ============================================================================

/// Where a verification mismatch was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Element index of an array kernel output.
    Element(usize),

    /// Result of the dot-product reduction.
    Reduction,
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Element(i) => write!(f, "index {i}"),
            Self::Reduction => write!(f, "reduction"),
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// Error type for stream benchmark operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// Buffer allocation failed; no array store is usable.
    #[error("Allocation failed for array '{array}': could not reserve {requested_bytes} bytes")]
    Allocation {
        /// Array that could not be allocated (`a`, `b`, `c`, or a device buffer label).
        array: &'static str,
        /// Number of bytes requested.
        requested_bytes: usize,
    },

    /// Requested device is invalid or the backend is unsupported on this build.
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A device failed while executing or synchronizing a kernel.
    #[error("Device failure: {0}")]
    DeviceFailure(String),

    /// Caller-supplied readback buffer has the wrong length.
    #[error("Size mismatch for array '{array}': expected {expected} elements, got {got}")]
    SizeMismatch {
        /// Array being read back.
        array: &'static str,
        /// Array length N.
        expected: usize,
        /// Length of the destination buffer.
        got: usize,
    },

    /// Backend results differ from the analytically expected values.
    #[error(
        "Verification failed in {kernel} at {location}: expected {expected:e}, observed {observed:e}"
    )]
    Verification {
        /// Kernel responsible for the checked value.
        kernel: &'static str,
        /// Element index or the reduction.
        location: Location,
        /// Expected value.
        expected: f64,
        /// Value produced by the backend.
        observed: f64,
    },

    /// Array size must be positive and its byte total representable.
    #[error("Invalid array size: {0} (must be > 0 and fit in addressable memory)")]
    InvalidArraySize(usize),

    /// At least one repetition is required, and the full kernel plan must
    /// be representable in memory.
    #[error("Invalid repetitions: {0} (must be >= 1 and the kernel plan must fit in memory)")]
    InvalidRepetitions(usize),

    /// The kernel selection resolved to no kernels.
    #[error("Kernel selection is empty")]
    EmptyKernelSelection,

    /// A kernel was listed more than once in a custom selection.
    #[error("Kernel '{0}' selected more than once")]
    DuplicateKernel(&'static str),

    /// Scalar or initial value is NaN or infinite.
    #[error("Invalid numeric value: {0}")]
    InvalidNumericValue(String),

    /// Generic invalid input error with a descriptive message.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Parameter was set multiple times in the builder.
    #[error(
        "Parameter '{parameter}' was set multiple times. Each parameter can only be configured once."
    )]
    DuplicateParameter {
        /// Name of the parameter that was set multiple times.
        parameter: &'static str,
    },
}

impl StreamError {
    /// Whether the error aborts a benchmark run.
    ///
    /// `SizeMismatch` and `InvalidInput` are reported to the caller of a
    /// readback and leave the array store untouched.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::SizeMismatch { .. } | Self::InvalidInput(_))
    }

    /// Process exit status for this error. Never zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArraySize(_)
            | Self::InvalidRepetitions(_)
            | Self::EmptyKernelSelection
            | Self::DuplicateKernel(_)
            | Self::InvalidNumericValue(_)
            | Self::InvalidInput(_)
            | Self::DuplicateParameter { .. } => 2,
            Self::Allocation { .. } => 3,
            Self::DeviceUnavailable(_) | Self::DeviceFailure(_) => 4,
            Self::SizeMismatch { .. } => 5,
            Self::Verification { .. } => 6,
        }
    }
}
