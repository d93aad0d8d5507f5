//! Host readback destinations.
//!
//! ## Purpose
//!
//! This module lets `read_arrays` write into several host containers
//! (slices, vectors, `ndarray` 1-D arrays) through a single interface.
//!
//! ## Design notes
//!
//! * **Zero-copy**: Destinations expose their own storage as a mutable slice.
//! * **Fail-fast validation**: Non-contiguous arrays are rejected before any
//!   engine work.
//!
//! ## Invariants
//!
//! * Destinations must be contiguous in memory.
//! * Length checks remain the engine's responsibility (`SizeMismatch`).

// External dependencies
use ndarray::{Array1, ArrayBase, DataMut, Ix1};

// Export dependencies from stream crate
use stream::internals::algorithms::kernels::StreamEngine;
use stream::internals::primitives::element::StreamFloat;
use stream::internals::primitives::errors::StreamError;

/// Trait for host containers that can receive array contents.
pub trait HostBuffer<T: StreamFloat> {
    /// Mutable contiguous view of the container.
    fn as_host_slice_mut(&mut self) -> Result<&mut [T], StreamError>;
}

impl<T: StreamFloat> HostBuffer<T> for [T] {
    fn as_host_slice_mut(&mut self) -> Result<&mut [T], StreamError> {
        Ok(self)
    }
}

impl<T: StreamFloat> HostBuffer<T> for Vec<T> {
    fn as_host_slice_mut(&mut self) -> Result<&mut [T], StreamError> {
        Ok(self.as_mut_slice())
    }
}

impl<T: StreamFloat, S> HostBuffer<T> for ArrayBase<S, Ix1>
where
    S: DataMut<Elem = T>,
{
    fn as_host_slice_mut(&mut self) -> Result<&mut [T], StreamError> {
        self.as_slice_mut().ok_or_else(|| {
            StreamError::InvalidInput("ndarray destination must be contiguous in memory".to_string())
        })
    }
}

/// Copy the engine's arrays into any three host containers.
pub fn read_arrays_into<T, A, B, C>(
    engine: &dyn StreamEngine<T>,
    a: &mut A,
    b: &mut B,
    c: &mut C,
) -> Result<(), StreamError>
where
    T: StreamFloat,
    A: HostBuffer<T> + ?Sized,
    B: HostBuffer<T> + ?Sized,
    C: HostBuffer<T> + ?Sized,
{
    let a = a.as_host_slice_mut()?;
    let b = b.as_host_slice_mut()?;
    let c = c.as_host_slice_mut()?;
    engine.read_arrays(a, b, c)
}

/// Read the engine's arrays into freshly allocated `ndarray` vectors.
pub fn read_arrays_ndarray<T: StreamFloat>(
    engine: &dyn StreamEngine<T>,
) -> Result<(Array1<T>, Array1<T>, Array1<T>), StreamError> {
    let n = engine.array_size();
    let mut a = Array1::zeros(n);
    let mut b = Array1::zeros(n);
    let mut c = Array1::zeros(n);
    read_arrays_into(engine, &mut a, &mut b, &mut c)?;
    Ok((a, b, c))
}
