//! High-level API for stream benchmarks.
//!
//! ## Purpose
//!
//! This module provides the primary user-facing entry point. It implements a
//! fluent builder for configuring a benchmark run and produces a
//! [`StreamBenchmark`] that constructs the selected backend and drives it.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with sensible defaults for all parameters.
//! * **Validated**: Parameters are validated when `.build()` is called.
//! * **Extensible**: Extension crates install an engine factory through a
//!   hidden hook; without one only the serial backend is available.
//!
//! ### Configuration Flow
//!
//! 1. Create a [`StreamBuilder`] via `Stream::new()`.
//! 2. Chain configuration methods (`.array_size()`, `.repetitions()`, etc.).
//! 3. Call `.build()` to validate and obtain a [`StreamBenchmark`].
//! 4. Call `.run()` to execute and obtain a [`BenchmarkResult`].

// Internal dependencies
use crate::algorithms::kernels::{EngineFactoryFn, EngineRequest, StreamEngine};
use crate::algorithms::sequential::{HostDevices, SerialStream};
use crate::engine::driver::{BenchmarkConfig, BenchmarkDriver};
use crate::engine::validator::Validator;

// Publicly re-exported types
pub use crate::algorithms::kernels::{DeviceQuery, Kernel, KernelSelection, Schedule};
pub use crate::engine::driver::DriverState;
pub use crate::engine::output::BenchmarkResult;
pub use crate::evaluation::statistics::{BandwidthUnit, KernelReport, TimingStats};
pub use crate::evaluation::verifier::InitValues;
pub use crate::primitives::backend::Backend;
pub use crate::primitives::element::StreamFloat;
pub use crate::primitives::errors::{Location, StreamError};

/// Fluent builder for configuring a benchmark run.
#[derive(Debug, Clone)]
pub struct StreamBuilder<T> {
    /// Elements per array.
    pub array_size: Option<usize>,

    /// Repetitions of every selected kernel.
    pub repetitions: Option<usize>,

    /// Kernels to run.
    pub kernels: Option<KernelSelection>,

    /// Verify the final state after the run.
    pub verify: Option<bool>,

    /// Order in which repetitions are issued.
    pub schedule: Option<Schedule>,

    /// Scalar used by `mul`, `triad` and `nstream`.
    pub scalar: Option<T>,

    /// Fill values for `init_arrays`.
    pub init_values: Option<InitValues<T>>,

    /// Device index.
    pub device: Option<usize>,

    /// Execution backend.
    pub backend: Option<Backend>,

    /// Worker thread count for host-parallel backends.
    pub threads: Option<usize>,

    /// Unit used when rendering bandwidth.
    pub unit: Option<BandwidthUnit>,

    /// Exclude the first repetition from statistics.
    pub discard_first: Option<bool>,

    // ======================================
    // DEV
    // ======================================
    /// Engine factory installed by extension crates.
    #[doc(hidden)]
    pub custom_engine: Option<EngineFactoryFn<T>>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl<T: StreamFloat> Default for StreamBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StreamFloat> StreamBuilder<T> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            array_size: None,
            repetitions: None,
            kernels: None,
            verify: None,
            schedule: None,
            scalar: None,
            init_values: None,
            device: None,
            backend: None,
            threads: None,
            unit: None,
            discard_first: None,
            custom_engine: None,
            duplicate_param: None,
        }
    }

    /// Set the number of elements per array.
    pub fn array_size(mut self, array_size: usize) -> Self {
        if self.array_size.is_some() {
            self.duplicate_param = Some("array_size");
        }
        self.array_size = Some(array_size);
        self
    }

    /// Set the number of repetitions of every kernel.
    pub fn repetitions(mut self, repetitions: usize) -> Self {
        if self.repetitions.is_some() {
            self.duplicate_param = Some("repetitions");
        }
        self.repetitions = Some(repetitions);
        self
    }

    /// Select the kernels to run.
    pub fn kernels(mut self, kernels: KernelSelection) -> Self {
        if self.kernels.is_some() {
            self.duplicate_param = Some("kernels");
        }
        self.kernels = Some(kernels);
        self
    }

    /// Enable or disable post-run verification.
    pub fn verify(mut self, verify: bool) -> Self {
        if self.verify.is_some() {
            self.duplicate_param = Some("verify");
        }
        self.verify = Some(verify);
        self
    }

    /// Set the repetition schedule.
    pub fn schedule(mut self, schedule: Schedule) -> Self {
        if self.schedule.is_some() {
            self.duplicate_param = Some("schedule");
        }
        self.schedule = Some(schedule);
        self
    }

    /// Set the scalar used by `mul`, `triad` and `nstream`.
    pub fn scalar(mut self, scalar: T) -> Self {
        if self.scalar.is_some() {
            self.duplicate_param = Some("scalar");
        }
        self.scalar = Some(scalar);
        self
    }

    /// Set the initial values of `a`, `b` and `c`.
    pub fn init_values(mut self, a: T, b: T, c: T) -> Self {
        if self.init_values.is_some() {
            self.duplicate_param = Some("init_values");
        }
        self.init_values = Some(InitValues { a, b, c });
        self
    }

    /// Set the device index.
    pub fn device(mut self, device: usize) -> Self {
        if self.device.is_some() {
            self.duplicate_param = Some("device");
        }
        self.device = Some(device);
        self
    }

    /// Set the execution backend.
    pub fn backend(mut self, backend: Backend) -> Self {
        if self.backend.is_some() {
            self.duplicate_param = Some("backend");
        }
        self.backend = Some(backend);
        self
    }

    /// Set the worker thread count for host-parallel backends.
    pub fn threads(mut self, threads: usize) -> Self {
        if self.threads.is_some() {
            self.duplicate_param = Some("threads");
        }
        self.threads = Some(threads);
        self
    }

    /// Set the bandwidth unit used for rendering.
    pub fn unit(mut self, unit: BandwidthUnit) -> Self {
        if self.unit.is_some() {
            self.duplicate_param = Some("unit");
        }
        self.unit = Some(unit);
        self
    }

    /// Exclude (or include) the first repetition in the statistics.
    pub fn discard_first(mut self, discard: bool) -> Self {
        if self.discard_first.is_some() {
            self.duplicate_param = Some("discard_first");
        }
        self.discard_first = Some(discard);
        self
    }

    // ==========================
    // Development Options
    // ==========================

    /// Install an engine factory.
    #[doc(hidden)]
    pub fn custom_engine(mut self, factory: EngineFactoryFn<T>) -> Self {
        self.custom_engine = Some(factory);
        self
    }

    /// Resolve the configuration without validating it.
    pub fn config(&self) -> BenchmarkConfig<T> {
        let mut config = BenchmarkConfig::default();

        if let Some(n) = self.array_size {
            config.array_size = n;
        }
        if let Some(r) = self.repetitions {
            config.repetitions = r;
        }
        if let Some(k) = &self.kernels {
            config.kernels = k.clone();
        }
        if let Some(v) = self.verify {
            config.verify = v;
        }
        if let Some(s) = self.schedule {
            config.schedule = s;
        }
        if let Some(s) = self.scalar {
            config.scalar = s;
        }
        if let Some(init) = self.init_values {
            config.init = init;
        }
        if let Some(d) = self.device {
            config.device = d;
        }
        if let Some(b) = self.backend {
            config.backend = b;
        }
        config.threads = self.threads;
        if let Some(u) = self.unit {
            config.unit = u;
        }
        if let Some(df) = self.discard_first {
            config.discard_first = df;
        }

        config
    }

    /// Validate the configuration and produce a runnable benchmark.
    pub fn build(self) -> Result<StreamBenchmark<T>, StreamError> {
        Validator::validate_no_duplicates(self.duplicate_param)?;
        let driver = BenchmarkDriver::new(self.config())?;
        Ok(StreamBenchmark {
            driver,
            factory: self.custom_engine.unwrap_or(serial_engine::<T>),
        })
    }
}

// ============================================================================
// Runnable Benchmark
// ============================================================================

/// A validated benchmark, ready to run.
#[derive(Debug, Clone)]
pub struct StreamBenchmark<T> {
    driver: BenchmarkDriver<T>,
    factory: EngineFactoryFn<T>,
}

impl<T: StreamFloat> StreamBenchmark<T> {
    /// Construct the configured engine and run the benchmark.
    pub fn run(&mut self) -> Result<BenchmarkResult<T>, StreamError> {
        self.driver.run_with(self.factory)
    }

    /// Run against a caller-constructed engine.
    pub fn run_on(
        &mut self,
        engine: &mut dyn StreamEngine<T>,
    ) -> Result<BenchmarkResult<T>, StreamError> {
        self.driver.run(engine)
    }

    /// Construct the configured engine without running it.
    pub fn engine(&self) -> Result<Box<dyn StreamEngine<T>>, StreamError> {
        (self.factory)(&self.driver.config().engine_request())
    }

    /// The validated configuration.
    pub fn config(&self) -> &BenchmarkConfig<T> {
        self.driver.config()
    }

    /// Current driver state.
    pub fn state(&self) -> DriverState {
        self.driver.state()
    }
}

/// Device queries for the backends available without extension crates.
pub fn device_query(backend: Backend) -> Result<Box<dyn DeviceQuery>, StreamError> {
    match backend {
        Backend::Serial => Ok(Box::new(HostDevices)),
        other => Err(unsupported(other)),
    }
}

fn serial_engine<T: StreamFloat>(
    request: &EngineRequest<T>,
) -> Result<Box<dyn StreamEngine<T>>, StreamError> {
    match request.backend {
        Backend::Serial => Ok(Box::new(SerialStream::from_request(request)?)),
        other => Err(unsupported(other)),
    }
}

fn unsupported(backend: Backend) -> StreamError {
    StreamError::DeviceUnavailable(format!(
        "backend '{backend}' is not available in this build; link the fastStream crate"
    ))
}
