//! High-level API for stream benchmarks with accelerated backends.
//!
//! ## Purpose
//!
//! This module provides the user-facing builder of `fastStream`. It wraps the
//! `stream` builder and installs the engine factory that knows the rayon and
//! wgpu backends.
//!
//! ## Design notes
//!
//! * **Fluent Integration**: Re-uses the base `stream` builder; every setter
//!   delegates to it, so validation and duplicate detection are shared.
//! * **Parallel-First**: Defaults to the CPU backend when the `cpu` feature
//!   is enabled.
//!
//! ### Configuration Flow
//!
//! 1. Create a [`ParallelStreamBuilder`] via `Stream::new()`.
//! 2. Chain configuration methods (`.array_size()`, `.backend()`, etc.).
//! 3. Call `.build()` and then `.run()`.

// Internal dependencies
use crate::engine::create_engine;

// Publicly re-exported types
pub use stream::internals::algorithms::kernels::{
    DeviceQuery, Kernel, KernelSelection, Schedule, StreamEngine,
};
pub use stream::internals::api::{StreamBenchmark, StreamBuilder};
pub use stream::internals::engine::driver::{BenchmarkConfig, DriverState};
pub use stream::internals::engine::output::BenchmarkResult;
pub use stream::internals::evaluation::statistics::{BandwidthUnit, KernelReport, TimingStats};
pub use stream::internals::evaluation::verifier::InitValues;
pub use stream::internals::primitives::backend::Backend;
pub use stream::internals::primitives::element::StreamFloat;
pub use stream::internals::primitives::errors::{Location, StreamError};

/// Backend used when none is configured.
#[cfg(feature = "cpu")]
pub const DEFAULT_BACKEND: Backend = Backend::CPU;

/// Backend used when none is configured.
#[cfg(not(feature = "cpu"))]
pub const DEFAULT_BACKEND: Backend = Backend::Serial;

// ============================================================================
// Extended Builder
// ============================================================================

/// Builder for stream benchmarks with parallel and GPU backends.
#[derive(Debug, Clone)]
pub struct ParallelStreamBuilder<T> {
    /// Base builder from the stream crate
    pub base: StreamBuilder<T>,
}

impl<T: StreamFloat> Default for ParallelStreamBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StreamFloat> ParallelStreamBuilder<T> {
    /// Create a new builder.
    ///
    /// # Defaults
    ///
    /// * All base parameters from the stream builder
    /// * backend: CPU when the `cpu` feature is enabled
    pub fn new() -> Self {
        Self {
            base: StreamBuilder::new(),
        }
    }

    /// Set the execution backend.
    pub fn backend(mut self, backend: Backend) -> Self {
        self.base = self.base.backend(backend);
        self
    }

    /// Set the worker thread count of the CPU backend.
    pub fn threads(mut self, threads: usize) -> Self {
        self.base = self.base.threads(threads);
        self
    }

    /// Set the device index (adapter index on the GPU backend).
    pub fn device(mut self, device: usize) -> Self {
        self.base = self.base.device(device);
        self
    }

    // ========================================================================
    // Shared Setters
    // ========================================================================

    /// Set the number of elements per array.
    pub fn array_size(mut self, array_size: usize) -> Self {
        self.base = self.base.array_size(array_size);
        self
    }

    /// Set the number of repetitions of every kernel.
    pub fn repetitions(mut self, repetitions: usize) -> Self {
        self.base = self.base.repetitions(repetitions);
        self
    }

    /// Select the kernels to run.
    pub fn kernels(mut self, kernels: KernelSelection) -> Self {
        self.base = self.base.kernels(kernels);
        self
    }

    /// Enable or disable post-run verification.
    pub fn verify(mut self, verify: bool) -> Self {
        self.base = self.base.verify(verify);
        self
    }

    /// Set the repetition schedule.
    pub fn schedule(mut self, schedule: Schedule) -> Self {
        self.base = self.base.schedule(schedule);
        self
    }

    /// Set the scalar used by `mul`, `triad` and `nstream`.
    pub fn scalar(mut self, scalar: T) -> Self {
        self.base = self.base.scalar(scalar);
        self
    }

    /// Set the initial values of `a`, `b` and `c`.
    pub fn init_values(mut self, a: T, b: T, c: T) -> Self {
        self.base = self.base.init_values(a, b, c);
        self
    }

    /// Set the bandwidth unit used for rendering.
    pub fn unit(mut self, unit: BandwidthUnit) -> Self {
        self.base = self.base.unit(unit);
        self
    }

    /// Exclude (or include) the first repetition in the statistics.
    pub fn discard_first(mut self, discard: bool) -> Self {
        self.base = self.base.discard_first(discard);
        self
    }

    // ========================================================================
    // Build Method
    // ========================================================================

    /// Validate the configuration and produce a runnable benchmark.
    pub fn build(self) -> Result<StreamBenchmark<T>, StreamError> {
        let mut base = self.base;
        if base.backend.is_none() {
            base.backend = Some(DEFAULT_BACKEND);
        }
        base.custom_engine(create_engine::<T>).build()
    }
}
