//! Serial reference backend.
//!
//! ## Purpose
//!
//! This module provides [`SerialStream`], a single-threaded Kernel Engine
//! that walks the index range in order. It is the reference every other
//! backend is compared against and the fallback when no extension crate is
//! linked.
//!
//! ## Design notes
//!
//! * **Index-driven**: Kernels iterate an [`IndexRange`] and index the arrays,
//!   mirroring how data-parallel backends drive their loops.
//! * **Blocked reduction**: `dot` sums fixed-size blocks into `f64` partials
//!   before combining them, bounding rounding growth for large N.
//!
//! ## Invariants
//!
//! * The array store is exclusively owned by the engine.
//! * Results of the five array kernels match any conforming backend bit for bit
//!   when that backend evaluates the same expressions without contraction.

// External dependencies
use tracing::debug;

// Internal dependencies
use crate::algorithms::kernels::{
    DEVICE_DRIVER_UNAVAILABLE, DEVICE_NAME_UNAVAILABLE, DeviceQuery, EngineRequest, StreamEngine,
};
use crate::primitives::backend::Backend;
use crate::primitives::buffer::ArrayStore;
use crate::primitives::element::StreamFloat;
use crate::primitives::errors::StreamError;
use crate::primitives::range::IndexRange;

/// Elements per partial sum in the blocked dot product.
const DOT_BLOCK: usize = 4096;

// ============================================================================
// Serial Engine
// ============================================================================

/// Single-threaded reference Kernel Engine.
///
/// The engine exclusively owns its arrays and cannot be duplicated:
///
/// ```compile_fail
/// use stream::prelude::*;
///
/// let engine = SerialStream::<f64>::new(4, 0, 0.4).unwrap();
/// let twin = engine.clone();
/// ```
#[derive(Debug)]
pub struct SerialStream<T> {
    store: ArrayStore<T>,
    range: IndexRange,
    scalar: T,
}

impl<T: StreamFloat> SerialStream<T> {
    /// Allocate the array store for `array_size` elements.
    ///
    /// The device index is ignored: the host is the only device.
    pub fn new(array_size: usize, device: usize, scalar: T) -> Result<Self, StreamError> {
        if device != 0 {
            debug!(device, "serial backend ignores the device index");
        }
        let store = ArrayStore::allocate(array_size)?;
        Ok(Self {
            range: IndexRange::new(store.len()),
            store,
            scalar,
        })
    }

    /// Construct from a factory request.
    pub fn from_request(request: &EngineRequest<T>) -> Result<Self, StreamError> {
        Self::new(request.array_size, request.device, request.scalar)
    }

    /// The scalar used by `mul`, `triad` and `nstream`.
    pub fn scalar(&self) -> T {
        self.scalar
    }
}

impl<T: StreamFloat> StreamEngine<T> for SerialStream<T> {
    fn backend(&self) -> Backend {
        Backend::Serial
    }

    fn implementation(&self) -> String {
        "Serial".to_string()
    }

    fn array_size(&self) -> usize {
        self.store.len()
    }

    fn init_arrays(&mut self, init_a: T, init_b: T, init_c: T) -> Result<(), StreamError> {
        self.store.fill(init_a, init_b, init_c);
        Ok(())
    }

    fn read_arrays(&self, a: &mut [T], b: &mut [T], c: &mut [T]) -> Result<(), StreamError> {
        self.store.read_into(a, b, c)
    }

    fn copy(&mut self) -> Result<(), StreamError> {
        let (a, _, c) = self.store.split_mut();
        for i in self.range {
            c[i] = a[i];
        }
        Ok(())
    }

    fn mul(&mut self) -> Result<(), StreamError> {
        let scalar = self.scalar;
        let (_, b, c) = self.store.split_mut();
        for i in self.range {
            b[i] = scalar * c[i];
        }
        Ok(())
    }

    fn add(&mut self) -> Result<(), StreamError> {
        let (a, b, c) = self.store.split_mut();
        for i in self.range {
            c[i] = a[i] + b[i];
        }
        Ok(())
    }

    fn triad(&mut self) -> Result<(), StreamError> {
        let scalar = self.scalar;
        let (a, b, c) = self.store.split_mut();
        for i in self.range {
            a[i] = b[i] + scalar * c[i];
        }
        Ok(())
    }

    fn nstream(&mut self) -> Result<(), StreamError> {
        let scalar = self.scalar;
        let (a, b, c) = self.store.split_mut();
        for i in self.range {
            a[i] = a[i] + b[i] + scalar * c[i];
        }
        Ok(())
    }

    fn dot(&mut self) -> Result<T, StreamError> {
        let a = self.store.a();
        let b = self.store.b();
        let sum: f64 = self
            .range
            .blocks(DOT_BLOCK)
            .map(|block| {
                block
                    .iter()
                    .fold(0.0_f64, |acc, i| acc + (a[i] * b[i]).widen())
            })
            .sum();
        Ok(T::narrow(sum))
    }
}

// ============================================================================
// Host Device Queries
// ============================================================================

/// Device queries for backends whose only device is the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostDevices;

impl DeviceQuery for HostDevices {
    fn list_devices(&self) -> Vec<String> {
        vec!["Host".to_string()]
    }

    fn device_name(&self, _index: usize) -> String {
        DEVICE_NAME_UNAVAILABLE.to_string()
    }

    fn device_driver(&self, _index: usize) -> String {
        DEVICE_DRIVER_UNAVAILABLE.to_string()
    }
}
