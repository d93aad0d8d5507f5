//! The Kernel Engine contract.
//!
//! ## Purpose
//!
//! This module defines the six benchmark kernels, how they are selected and
//! ordered, and the [`StreamEngine`] trait every backend implements. It is
//! the boundary between the backend-agnostic harness (driver, verifier) and
//! the backend-specific execution strategies.
//!
//! ## Design notes
//!
//! * **Object safe**: Engines are selected at construction time and driven
//!   through `Box<dyn StreamEngine<T>>`; the element type stays a compile-time
//!   generic.
//! * **Synchronous**: Every kernel returns only after all of its parallel work
//!   (including device work) has completed.
//! * **Fixed expressions**: Backends evaluate `nstream` as
//!   `(a + b) + scalar * c` so results are comparable across backends.
//!
//! ## Key concepts
//!
//! | Kernel    | Operation                       | Arrays touched |
//! |-----------|---------------------------------|----------------|
//! | `copy`    | `c[i] = a[i]`                   | 2              |
//! | `mul`     | `b[i] = scalar * c[i]`          | 2              |
//! | `add`     | `c[i] = a[i] + b[i]`            | 3              |
//! | `triad`   | `a[i] = b[i] + scalar * c[i]`   | 3              |
//! | `nstream` | `a[i] += b[i] + scalar * c[i]`  | 4              |
//! | `dot`     | `sum(a[i] * b[i])`              | 2              |
//!
//! ## Invariants
//!
//! * No element's result depends on another element within one kernel call.
//! * `nstream` applies `b[i]` exactly once per call.
//! * A kernel either updates every element or returns an error.
//!
//! ## Non-goals
//!
//! * This module does not time kernels (handled by the driver).
//! * This module does not check results (handled by the verifier).

// External dependencies
use core::fmt::{Display, Formatter, Result as FmtResult};
use core::mem::size_of;

// Internal dependencies
use crate::primitives::backend::Backend;
use crate::primitives::element::StreamFloat;
use crate::primitives::errors::StreamError;

// ============================================================================
// Kernels
// ============================================================================

/// One of the three benchmark arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayId {
    /// Array `a`.
    A,
    /// Array `b`.
    B,
    /// Array `c`.
    C,
}

impl ArrayId {
    /// Single-letter array name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
        }
    }
}

/// The fixed benchmark kernel set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    /// `c[i] = a[i]`
    Copy,
    /// `b[i] = scalar * c[i]`
    Mul,
    /// `c[i] = a[i] + b[i]`
    Add,
    /// `a[i] = b[i] + scalar * c[i]`
    Triad,
    /// `a[i] = a[i] + b[i] + scalar * c[i]`
    Nstream,
    /// `sum(a[i] * b[i])`
    Dot,
}

impl Kernel {
    /// Every kernel, in reporting order.
    pub const ALL: [Kernel; 6] = [
        Kernel::Copy,
        Kernel::Mul,
        Kernel::Add,
        Kernel::Triad,
        Kernel::Dot,
        Kernel::Nstream,
    ];

    /// Kernel name as shown in reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Copy => "Copy",
            Self::Mul => "Mul",
            Self::Add => "Add",
            Self::Triad => "Triad",
            Self::Nstream => "Nstream",
            Self::Dot => "Dot",
        }
    }

    /// Number of array traversals per call (reads plus writes).
    pub fn arrays_touched(&self) -> usize {
        match self {
            Self::Copy | Self::Mul | Self::Dot => 2,
            Self::Add | Self::Triad => 3,
            Self::Nstream => 4,
        }
    }

    /// Bytes moved by one call over arrays of `array_size` elements of `T`.
    pub fn bytes_moved<T>(&self, array_size: usize) -> usize {
        self.arrays_touched() * array_size * size_of::<T>()
    }

    /// Array mutated by this kernel (`None` for the reduction).
    pub fn writes(&self) -> Option<ArrayId> {
        match self {
            Self::Copy | Self::Add => Some(ArrayId::C),
            Self::Mul => Some(ArrayId::B),
            Self::Triad | Self::Nstream => Some(ArrayId::A),
            Self::Dot => None,
        }
    }
}

impl Display for Kernel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.pad(self.name())
    }
}

// ============================================================================
// Selection and Scheduling
// ============================================================================

/// Which kernels a run executes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KernelSelection {
    /// Copy, Mul, Add, Triad, Dot.
    #[default]
    Classic,

    /// Classic plus Nstream.
    All,

    /// Triad only.
    TriadOnly,

    /// Nstream only.
    NstreamOnly,

    /// An explicit, ordered list.
    Custom(Vec<Kernel>),
}

impl KernelSelection {
    /// Resolve into the ordered kernel list.
    pub fn kernels(&self) -> Vec<Kernel> {
        match self {
            Self::Classic => vec![
                Kernel::Copy,
                Kernel::Mul,
                Kernel::Add,
                Kernel::Triad,
                Kernel::Dot,
            ],
            Self::All => Kernel::ALL.to_vec(),
            Self::TriadOnly => vec![Kernel::Triad],
            Self::NstreamOnly => vec![Kernel::Nstream],
            Self::Custom(list) => list.clone(),
        }
    }
}

/// Order in which kernel repetitions are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// All repetitions of one kernel before the next kernel starts.
    #[default]
    KernelMajor,

    /// Each repetition runs every selected kernel once, in selection order.
    Interleaved,
}

impl Schedule {
    /// The exact sequence of kernel calls for `repetitions` of `kernels`.
    ///
    /// The driver only plans repetition counts accepted by
    /// `Validator::validate_repetitions`.
    pub fn plan(&self, kernels: &[Kernel], repetitions: usize) -> Vec<Kernel> {
        let mut plan = Vec::new();
        let _ = plan.try_reserve_exact(kernels.len().saturating_mul(repetitions));
        match self {
            Self::KernelMajor => {
                for &kernel in kernels {
                    plan.extend(core::iter::repeat_n(kernel, repetitions));
                }
            }
            Self::Interleaved => {
                for _ in 0..repetitions {
                    plan.extend_from_slice(kernels);
                }
            }
        }
        plan
    }
}

impl Display for Schedule {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::KernelMajor => f.write_str("kernel-major"),
            Self::Interleaved => f.write_str("interleaved"),
        }
    }
}

// ============================================================================
// Engine Contract
// ============================================================================

/// Capability set every backend implements over an array store of `T`.
pub trait StreamEngine<T: StreamFloat>: Send {
    /// Backend identifier of this engine.
    fn backend(&self) -> Backend;

    /// Human-readable implementation string (runtime, thread count, device).
    fn implementation(&self) -> String;

    /// Number of elements per array.
    fn array_size(&self) -> usize;

    /// Set every element of `a`, `b`, `c` to the given values.
    fn init_arrays(&mut self, init_a: T, init_b: T, init_c: T) -> Result<(), StreamError>;

    /// Copy the current arrays into host buffers of exactly `array_size()` elements.
    fn read_arrays(&self, a: &mut [T], b: &mut [T], c: &mut [T]) -> Result<(), StreamError>;

    /// `c[i] = a[i]`
    fn copy(&mut self) -> Result<(), StreamError>;

    /// `b[i] = scalar * c[i]`
    fn mul(&mut self) -> Result<(), StreamError>;

    /// `c[i] = a[i] + b[i]`
    fn add(&mut self) -> Result<(), StreamError>;

    /// `a[i] = b[i] + scalar * c[i]`
    fn triad(&mut self) -> Result<(), StreamError>;

    /// `a[i] = a[i] + b[i] + scalar * c[i]` in a single fused update.
    fn nstream(&mut self) -> Result<(), StreamError>;

    /// `sum(a[i] * b[i])`
    fn dot(&mut self) -> Result<T, StreamError>;

    /// Run one kernel; returns the reduction value for `Dot`.
    fn execute(&mut self, kernel: Kernel) -> Result<Option<T>, StreamError> {
        match kernel {
            Kernel::Copy => self.copy().map(|_| None),
            Kernel::Mul => self.mul().map(|_| None),
            Kernel::Add => self.add().map(|_| None),
            Kernel::Triad => self.triad().map(|_| None),
            Kernel::Nstream => self.nstream().map(|_| None),
            Kernel::Dot => self.dot().map(Some),
        }
    }
}

/// Informational device queries of a backend.
pub trait DeviceQuery {
    /// Names of the selectable devices, indexed by device number.
    fn list_devices(&self) -> Vec<String>;

    /// Device name, or a fixed "unavailable" sentinel.
    fn device_name(&self, index: usize) -> String;

    /// Device driver string, or a fixed "unavailable" sentinel.
    fn device_driver(&self, index: usize) -> String;
}

/// Sentinel returned when a backend has no device name to report.
pub const DEVICE_NAME_UNAVAILABLE: &str = "Device name unavailable";

/// Sentinel returned when a backend has no driver string to report.
pub const DEVICE_DRIVER_UNAVAILABLE: &str = "Device driver unavailable";

// ============================================================================
// Engine Construction
// ============================================================================

/// Parameters handed to an engine factory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineRequest<T> {
    /// Backend to construct.
    pub backend: Backend,
    /// Elements per array.
    pub array_size: usize,
    /// Device index (ignored by single-device backends).
    pub device: usize,
    /// Scalar used by `mul`, `triad`, `nstream`.
    pub scalar: T,
    /// Worker thread count for host-parallel backends (`None` = runtime default).
    pub threads: Option<usize>,
}

/// Signature for an engine factory installed by extension crates.
#[doc(hidden)]
pub type EngineFactoryFn<T> =
    fn(&EngineRequest<T>) -> Result<Box<dyn StreamEngine<T>>, StreamError>;
