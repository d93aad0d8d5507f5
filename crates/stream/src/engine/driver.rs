//! Benchmark Driver: repetition, timing and result assembly.
//!
//! ## Purpose
//!
//! This module orchestrates one benchmark run against a Kernel Engine:
//! initialize the arrays, execute the kernel plan while timing every call,
//! optionally verify the final state, and assemble the result set.
//!
//! ## Design notes
//!
//! * **Single plan**: The executed call sequence comes from
//!   [`Schedule::plan`], the same sequence the verifier replays.
//! * **Synchronous timing**: Each kernel call blocks until its work is
//!   complete, so wall-clock time around the call is the kernel time.
//! * **Observable state**: The driver exposes a [`DriverState`] that moves
//!   `Uninitialized → Initialized → Running → Verifying → Reporting → Done`,
//!   or to `Failed` on any error.
//!
//! ## Invariants
//!
//! * The engine's array size equals the configured array size.
//! * Every kernel of the selection is timed exactly `repetitions` times.
//! * No kernel error is retried.
//!
//! ## Non-goals
//!
//! * This module does not print results (see [`BenchmarkResult`]'s `Display`).
//! * This module does not choose a backend (see the engine factory).

// External dependencies
use core::mem::size_of;
use std::time::Instant;
use tracing::{debug, error, info, trace};

// Internal dependencies
use crate::algorithms::kernels::{
    EngineFactoryFn, EngineRequest, Kernel, KernelSelection, Schedule, StreamEngine,
};
use crate::engine::output::BenchmarkResult;
use crate::engine::validator::Validator;
use crate::evaluation::statistics::{BandwidthUnit, KernelReport, TimingStats};
use crate::evaluation::verifier::{InitValues, Verifier};
use crate::primitives::backend::Backend;
use crate::primitives::element::{
    DEFAULT_ARRAY_SIZE, DEFAULT_REPETITIONS, START_SCALAR, StreamFloat,
};
use crate::primitives::errors::StreamError;

// ============================================================================
// Configuration
// ============================================================================

/// Complete configuration of one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig<T> {
    /// Elements per array.
    pub array_size: usize,

    /// Repetitions of every selected kernel.
    pub repetitions: usize,

    /// Kernels to run.
    pub kernels: KernelSelection,

    /// Whether to verify the final state.
    pub verify: bool,

    /// Order in which kernel repetitions are issued.
    pub schedule: Schedule,

    /// Scalar used by `mul`, `triad` and `nstream`.
    pub scalar: T,

    /// Fill values for `init_arrays`.
    pub init: InitValues<T>,

    /// Device index passed to the engine.
    pub device: usize,

    /// Backend to construct.
    pub backend: Backend,

    /// Worker threads for host-parallel backends.
    pub threads: Option<usize>,

    /// Unit used when rendering bandwidth.
    pub unit: BandwidthUnit,

    /// Exclude the first repetition of each kernel from statistics when R > 1.
    pub discard_first: bool,
}

impl<T: StreamFloat> Default for BenchmarkConfig<T> {
    fn default() -> Self {
        Self {
            array_size: DEFAULT_ARRAY_SIZE,
            repetitions: DEFAULT_REPETITIONS,
            kernels: KernelSelection::default(),
            verify: true,
            schedule: Schedule::default(),
            scalar: T::narrow(START_SCALAR),
            init: InitValues::default(),
            device: 0,
            backend: Backend::default(),
            threads: None,
            unit: BandwidthUnit::default(),
            discard_first: true,
        }
    }
}

impl<T: StreamFloat> BenchmarkConfig<T> {
    /// Check every parameter; fails fast on the first violation.
    pub fn validate(&self) -> Result<(), StreamError> {
        Validator::validate_array_size::<T>(self.array_size)?;
        let kernels = self.kernels.kernels();
        Validator::validate_kernels(&kernels)?;
        Validator::validate_repetitions(self.repetitions, kernels.len())?;
        Validator::validate_scalar(self.scalar, "scalar")?;
        Validator::validate_scalar(self.init.a, "init_a")?;
        Validator::validate_scalar(self.init.b, "init_b")?;
        Validator::validate_scalar(self.init.c, "init_c")?;
        Validator::validate_threads(self.threads)
    }

    /// Construction parameters for the engine factory.
    pub fn engine_request(&self) -> EngineRequest<T> {
        EngineRequest {
            backend: self.backend,
            array_size: self.array_size,
            device: self.device,
            scalar: self.scalar,
            threads: self.threads,
        }
    }
}

// ============================================================================
// Driver State
// ============================================================================

/// Lifecycle state of a [`BenchmarkDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverState {
    /// No engine has been initialized.
    #[default]
    Uninitialized,

    /// Arrays have been filled with the initial values.
    Initialized,

    /// Executing the given repetition (zero-based) of a kernel.
    Running {
        /// Kernel being executed.
        kernel: Kernel,
        /// Zero-based repetition index of that kernel.
        repetition: usize,
    },

    /// Comparing the final state against expected values.
    Verifying,

    /// Assembling the result set.
    Reporting,

    /// The run completed.
    Done,

    /// Construction, a kernel, or verification failed.
    Failed,
}

// ============================================================================
// Driver
// ============================================================================

/// Runs a validated configuration against a Kernel Engine.
#[derive(Debug, Clone)]
pub struct BenchmarkDriver<T> {
    config: BenchmarkConfig<T>,
    state: DriverState,
}

impl<T: StreamFloat> BenchmarkDriver<T> {
    /// Validate `config` and create a driver for it.
    pub fn new(config: BenchmarkConfig<T>) -> Result<Self, StreamError> {
        config.validate()?;
        Ok(Self {
            config,
            state: DriverState::Uninitialized,
        })
    }

    /// The configuration this driver runs.
    pub fn config(&self) -> &BenchmarkConfig<T> {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Construct an engine through `factory`, then run it.
    pub fn run_with(
        &mut self,
        factory: EngineFactoryFn<T>,
    ) -> Result<BenchmarkResult<T>, StreamError> {
        let request = self.config.engine_request();
        let mut engine = match factory(&request) {
            Ok(engine) => engine,
            Err(err) => {
                error!(backend = %request.backend, %err, "engine construction failed");
                self.state = DriverState::Failed;
                return Err(err);
            }
        };
        info!(
            backend = %engine.backend(),
            implementation = %engine.implementation(),
            array_size = engine.array_size(),
            "engine constructed"
        );
        self.run(engine.as_mut())
    }

    /// Run the configured plan against `engine`.
    pub fn run(
        &mut self,
        engine: &mut dyn StreamEngine<T>,
    ) -> Result<BenchmarkResult<T>, StreamError> {
        self.state = DriverState::Uninitialized;
        let outcome = self.execute(engine);
        if outcome.is_err() {
            self.state = DriverState::Failed;
        }
        outcome
    }

    fn execute(
        &mut self,
        engine: &mut dyn StreamEngine<T>,
    ) -> Result<BenchmarkResult<T>, StreamError> {
        let config = &self.config;
        let n = config.array_size;
        if engine.array_size() != n {
            return Err(StreamError::InvalidInput(format!(
                "engine holds {} elements per array, configuration expects {n}",
                engine.array_size()
            )));
        }

        // Initialize
        engine.init_arrays(config.init.a, config.init.b, config.init.c)?;
        self.state = DriverState::Initialized;

        // Execute and time the plan
        let kernels = config.kernels.kernels();
        let plan = config.schedule.plan(&kernels, config.repetitions);
        let mut timings: Vec<Vec<f64>> = kernels
            .iter()
            .map(|_| Vec::with_capacity(config.repetitions))
            .collect();
        let mut last_dot = None;

        for &kernel in &plan {
            let slot = kernels.iter().position(|k| *k == kernel).unwrap_or(0);
            let repetition = timings[slot].len();
            self.state = DriverState::Running { kernel, repetition };

            let start = Instant::now();
            let value = engine.execute(kernel)?;
            let elapsed = start.elapsed().as_secs_f64();

            trace!(%kernel, repetition, elapsed, "repetition complete");
            if value.is_some() {
                last_dot = value;
            }
            timings[slot].push(elapsed);
        }

        // Verify
        let verified = if config.verify {
            self.state = DriverState::Verifying;
            let mut a = vec![T::zero(); n];
            let mut b = vec![T::zero(); n];
            let mut c = vec![T::zero(); n];
            engine.read_arrays(&mut a, &mut b, &mut c)?;
            Verifier::new(config.init, config.scalar, n).verify(&plan, &a, &b, &c, last_dot)?;
            true
        } else {
            false
        };

        // Report
        self.state = DriverState::Reporting;
        let mut reports = Vec::with_capacity(kernels.len());
        for (kernel, timings) in kernels.iter().copied().zip(timings) {
            let stats = TimingStats::from_timings(&timings, config.discard_first)
                .ok_or(StreamError::InvalidRepetitions(timings.len()))?;
            let report = KernelReport {
                kernel,
                bytes_per_call: kernel.bytes_moved::<T>(n),
                timings,
                stats,
            };
            debug!(
                %kernel,
                bandwidth = report.bandwidth_in(config.unit),
                unit = %config.unit,
                min = stats.min,
                max = stats.max,
                mean = stats.mean,
                "kernel summary"
            );
            reports.push(report);
        }

        self.state = DriverState::Done;
        info!(
            backend = %engine.backend(),
            kernels = reports.len(),
            repetitions = config.repetitions,
            verified,
            "benchmark complete"
        );

        Ok(BenchmarkResult {
            implementation: engine.implementation(),
            backend: engine.backend(),
            precision: T::PRECISION,
            element_bytes: size_of::<T>(),
            array_size: n,
            repetitions: config.repetitions,
            schedule: config.schedule,
            unit: config.unit,
            verified,
            dot: last_dot,
            reports,
        })
    }
}
