//! Tests for the benchmark driver and the fluent API.
//!
//! These tests verify the measurement protocol end to end:
//! - Builder configuration and validation
//! - Running the serial backend under both schedules
//! - Failure handling for faulty and unavailable backends
//! - Timing statistics and bandwidth computation
//! - Result rendering
//!
//! ## Test Organization
//!
//! 1. **Builder** - Defaults, duplicates, validation errors
//! 2. **Runs** - Serial runs, schedules, kernel selections
//! 3. **Failures** - Faulty engine, unavailable backend, size mismatch
//! 4. **Statistics** - First-repetition exclusion, bandwidth
//! 5. **Output** - Result helpers and Display

use approx::assert_relative_eq;

use stream::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

const N: usize = 4096;

fn small() -> Stream<f64> {
    Stream::new().array_size(N).repetitions(4)
}

/// Host engine whose triad corrupts one element of `a`.
struct FaultyTriad {
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    scalar: f64,
}

impl FaultyTriad {
    fn new(n: usize) -> Self {
        Self {
            a: vec![0.0; n],
            b: vec![0.0; n],
            c: vec![0.0; n],
            scalar: 0.4,
        }
    }
}

impl StreamEngine<f64> for FaultyTriad {
    fn backend(&self) -> Backend {
        Backend::Serial
    }

    fn implementation(&self) -> String {
        "FaultyTriad".to_string()
    }

    fn array_size(&self) -> usize {
        self.a.len()
    }

    fn init_arrays(&mut self, x: f64, y: f64, z: f64) -> Result<(), StreamError> {
        self.a.fill(x);
        self.b.fill(y);
        self.c.fill(z);
        Ok(())
    }

    fn read_arrays(&self, a: &mut [f64], b: &mut [f64], c: &mut [f64]) -> Result<(), StreamError> {
        a.copy_from_slice(&self.a);
        b.copy_from_slice(&self.b);
        c.copy_from_slice(&self.c);
        Ok(())
    }

    fn copy(&mut self) -> Result<(), StreamError> {
        self.c.copy_from_slice(&self.a);
        Ok(())
    }

    fn mul(&mut self) -> Result<(), StreamError> {
        for (b, c) in self.b.iter_mut().zip(&self.c) {
            *b = self.scalar * c;
        }
        Ok(())
    }

    fn add(&mut self) -> Result<(), StreamError> {
        for ((c, a), b) in self.c.iter_mut().zip(&self.a).zip(&self.b) {
            *c = a + b;
        }
        Ok(())
    }

    fn triad(&mut self) -> Result<(), StreamError> {
        for ((a, b), c) in self.a.iter_mut().zip(&self.b).zip(&self.c) {
            *a = b + self.scalar * c;
        }
        self.a[7] += 1.0;
        Ok(())
    }

    fn nstream(&mut self) -> Result<(), StreamError> {
        for ((a, b), c) in self.a.iter_mut().zip(&self.b).zip(&self.c) {
            *a = *a + b + self.scalar * c;
        }
        Ok(())
    }

    fn dot(&mut self) -> Result<f64, StreamError> {
        Ok(self.a.iter().zip(&self.b).map(|(a, b)| a * b).sum())
    }
}

// ============================================================================
// Builder Tests
// ============================================================================

/// Test the resolved defaults.
///
/// Verifies the default configuration of an unconfigured builder.
#[test]
fn test_builder_defaults() {
    let config = Stream::<f64>::new().config();

    assert_eq!(config.array_size, 1 << 25);
    assert_eq!(config.repetitions, 100);
    assert_eq!(config.kernels, KernelSelection::Classic);
    assert!(config.verify);
    assert_eq!(config.schedule, Schedule::KernelMajor);
    assert_eq!(config.scalar, 0.4);
    assert_eq!(config.init, InitValues { a: 0.1, b: 0.2, c: 0.0 });
    assert_eq!(config.backend, Backend::Serial);
    assert_eq!(config.unit, BandwidthUnit::GigaBytes);
    assert!(config.discard_first);
}

/// Test setting a parameter twice.
///
/// Verifies the builder reports the duplicated parameter.
#[test]
fn test_builder_duplicate_parameter() {
    let res = small().array_size(8).build();
    assert!(matches!(
        res,
        Err(StreamError::DuplicateParameter {
            parameter: "array_size"
        })
    ));
}

/// Test configuration validation errors.
///
/// Verifies each invalid parameter maps to its error variant.
#[test]
fn test_builder_validation_errors() {
    assert!(matches!(
        Stream::<f64>::new().array_size(0).build(),
        Err(StreamError::InvalidArraySize(0))
    ));
    assert!(matches!(
        Stream::<f64>::new().repetitions(0).build(),
        Err(StreamError::InvalidRepetitions(0))
    ));
    assert!(matches!(
        small().kernels(KernelSelection::Custom(vec![])).build(),
        Err(StreamError::EmptyKernelSelection)
    ));
    assert!(matches!(
        small()
            .kernels(KernelSelection::Custom(vec![Kernel::Copy, Kernel::Copy]))
            .build(),
        Err(StreamError::DuplicateKernel("Copy"))
    ));
    assert!(matches!(
        small().scalar(f64::NAN).build(),
        Err(StreamError::InvalidNumericValue(_))
    ));
    assert!(matches!(
        small().init_values(0.1, f64::INFINITY, 0.0).build(),
        Err(StreamError::InvalidNumericValue(_))
    ));
    assert!(matches!(
        small().threads(0).build(),
        Err(StreamError::InvalidInput(_))
    ));
}

/// Test that configuration errors exit with a usage status.
///
/// Verifies every error class has a distinct non-zero exit code.
#[test]
fn test_exit_codes() {
    let codes = [
        StreamError::InvalidRepetitions(0).exit_code(),
        StreamError::Allocation {
            array: "a",
            requested_bytes: 8,
        }
        .exit_code(),
        StreamError::DeviceUnavailable(String::new()).exit_code(),
        StreamError::SizeMismatch {
            array: "a",
            expected: 1,
            got: 2,
        }
        .exit_code(),
        StreamError::Verification {
            kernel: "Copy",
            location: Location::Element(0),
            expected: 1.0,
            observed: 2.0,
        }
        .exit_code(),
    ];

    assert!(codes.iter().all(|&c| c != 0));
    for (i, c) in codes.iter().enumerate() {
        assert!(!codes[..i].contains(c), "exit code {c} reused");
    }
}

// ============================================================================
// Run Tests
// ============================================================================

/// Test a classic serial run.
///
/// Verifies the report order, repetition counts and final state.
#[test]
fn test_serial_classic_run() {
    let mut bench = small().build().unwrap();
    assert_eq!(bench.state(), DriverState::Uninitialized);

    let result = bench.run().unwrap();

    assert_eq!(bench.state(), DriverState::Done);
    assert!(result.verified);
    assert_eq!(result.backend, Backend::Serial);
    assert_eq!(result.implementation, "Serial");
    assert_eq!(result.precision, "double");
    assert_eq!(result.element_bytes, 8);

    let order: Vec<Kernel> = result.reports.iter().map(|r| r.kernel).collect();
    assert_eq!(order, KernelSelection::Classic.kernels());
    for report in &result.reports {
        assert_eq!(report.timings.len(), 4);
        assert_eq!(report.stats.samples, 3, "first repetition is discarded");
        assert!(report.stats.min <= report.stats.mean);
        assert!(report.stats.mean <= report.stats.max);
        assert!(report.bandwidth() > 0.0);
    }

    let dot = result.dot.unwrap();
    assert_relative_eq!(dot, 0.096 * 0.04 * N as f64, max_relative = 1e-12);
}

/// Test the triad traffic model in a run.
///
/// Verifies triad moves `3 * N * sizeof(T)` bytes per call.
#[test]
fn test_triad_bytes_per_call() {
    let result = small().build().unwrap().run().unwrap();

    let triad = result.report(Kernel::Triad).unwrap();
    assert_eq!(triad.bytes_per_call, 3 * N * 8);
    assert!(result.report(Kernel::Nstream).is_none());
}

/// Test the interleaved schedule over every kernel.
///
/// Verifies the replay follows the interleaved order and passes.
#[test]
fn test_interleaved_all_kernels() {
    let result = small()
        .kernels(KernelSelection::All)
        .schedule(Schedule::Interleaved)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(result.verified);
    assert_eq!(result.schedule, Schedule::Interleaved);
    assert_eq!(result.reports.len(), 6);
}

/// Test the single-kernel selections.
///
/// Verifies triad-only and nstream-only runs verify.
#[test]
fn test_single_kernel_selections() {
    for selection in [KernelSelection::TriadOnly, KernelSelection::NstreamOnly] {
        let result = Stream::<f64>::new()
            .array_size(N)
            .repetitions(10)
            .kernels(selection)
            .build()
            .unwrap()
            .run()
            .unwrap();
        assert!(result.verified);
        assert_eq!(result.reports.len(), 1);
        assert_eq!(result.dot, None);
    }
}

/// Test a single-precision run with custom values.
///
/// Verifies the replay uses the configured scalar and initial values.
#[test]
fn test_f32_custom_values() {
    let result = Stream::<f32>::new()
        .array_size(N)
        .repetitions(3)
        .scalar(3.0)
        .init_values(1.0, 2.0, 0.5)
        .kernels(KernelSelection::All)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert!(result.verified);
    assert_eq!(result.precision, "float");
    assert_eq!(result.report(Kernel::Copy).unwrap().bytes_per_call, 2 * N * 4);
}

/// Test a run without verification.
///
/// Verifies a faulty engine completes and is reported as unverified.
#[test]
fn test_verification_disabled() {
    let mut bench = small().verify(false).build().unwrap();
    let mut engine = FaultyTriad::new(N);

    let result = bench.run_on(&mut engine).unwrap();
    assert!(!result.verified);
    assert_eq!(result.implementation, "FaultyTriad");
    assert_eq!(bench.state(), DriverState::Done);
}

/// Test driving a configuration directly.
///
/// Verifies the driver accepts a caller-built engine.
#[test]
fn test_driver_direct() {
    let config = BenchmarkConfig::<f64> {
        array_size: 64,
        repetitions: 2,
        ..Default::default()
    };
    let mut driver = BenchmarkDriver::new(config).unwrap();
    let mut engine = SerialStream::<f64>::new(64, 0, 0.4).unwrap();

    let result = driver.run(&mut engine).unwrap();
    assert!(result.verified);
    assert_eq!(driver.state(), DriverState::Done);
}

/// Test constructing the engine without running.
///
/// Verifies the engine matches the configured size.
#[test]
fn test_engine_construction() {
    let bench = small().build().unwrap();
    let engine = bench.engine().unwrap();
    assert_eq!(engine.array_size(), N);
    assert_eq!(engine.backend(), Backend::Serial);
}

// ============================================================================
// Failure Tests
// ============================================================================

/// Test a backend that corrupts triad.
///
/// Verifies the run fails, names triad and the index, and marks the driver failed.
#[test]
fn test_faulty_engine_fails_verification() {
    let mut bench = small().build().unwrap();
    let mut engine = FaultyTriad::new(N);

    let err = bench.run_on(&mut engine).unwrap_err();
    assert!(matches!(
        err,
        StreamError::Verification {
            kernel: "Triad",
            location: Location::Element(7),
            ..
        }
    ));
    assert_eq!(bench.state(), DriverState::Failed);
    assert!(err.to_string().contains("Triad"));
}

/// Test an accelerated backend without the extension crate.
///
/// Verifies construction fails with `DeviceUnavailable`.
#[test]
fn test_unavailable_backend() {
    for backend in [Backend::CPU, Backend::GPU] {
        let mut bench = small().backend(backend).build().unwrap();
        let res = bench.run();

        assert!(matches!(res, Err(StreamError::DeviceUnavailable(_))));
        assert_eq!(bench.state(), DriverState::Failed);
        assert!(device_query(backend).is_err());
    }
}

/// Test a configuration whose arrays cannot be allocated.
///
/// Verifies the allocation error reaches the caller and marks the driver failed.
#[test]
fn test_allocation_failure_marks_failed() {
    let mut bench = Stream::<f64>::new()
        .array_size(1 << 44)
        .repetitions(2)
        .build()
        .unwrap();

    let err = bench.run().unwrap_err();
    assert!(matches!(err, StreamError::Allocation { array: "a", .. }));
    assert!(err.is_fatal());
    assert_eq!(bench.state(), DriverState::Failed);
}

/// Test a repetition count whose kernel plan cannot be represented.
///
/// Verifies the builder rejects it instead of the run panicking.
#[test]
fn test_unrepresentable_repetitions() {
    let res = Stream::<f64>::new()
        .array_size(8)
        .repetitions(usize::MAX / 2)
        .build();
    assert!(matches!(res, Err(StreamError::InvalidRepetitions(_))));

    let res = Stream::<f64>::new()
        .array_size(8)
        .repetitions(usize::MAX)
        .kernels(KernelSelection::Custom(vec![Kernel::Copy]))
        .build();
    assert!(matches!(res, Err(StreamError::InvalidRepetitions(_))));
}

/// Test an engine whose size differs from the configuration.
///
/// Verifies the run is rejected before any kernel.
#[test]
fn test_engine_size_mismatch() {
    let mut bench = small().build().unwrap();
    let mut engine = SerialStream::<f64>::new(N / 2, 0, 0.4).unwrap();

    assert!(matches!(
        bench.run_on(&mut engine),
        Err(StreamError::InvalidInput(_))
    ));
    assert_eq!(bench.state(), DriverState::Failed);
}

// ============================================================================
// Statistics Tests
// ============================================================================

/// Test first-repetition exclusion.
///
/// Verifies the warm-up sample is dropped only when more than one exists.
#[test]
fn test_discard_first() {
    let timings = [10.0, 1.0, 2.0, 3.0];

    let stats = TimingStats::from_timings(&timings, true).unwrap();
    assert_eq!(stats.samples, 3);
    assert_relative_eq!(stats.min, 1.0);
    assert_relative_eq!(stats.max, 3.0);
    assert_relative_eq!(stats.mean, 2.0);

    let stats = TimingStats::from_timings(&timings, false).unwrap();
    assert_eq!(stats.samples, 4);
    assert_relative_eq!(stats.max, 10.0);
    assert_relative_eq!(stats.mean, 4.0);

    let single = TimingStats::from_timings(&[5.0], true).unwrap();
    assert_eq!(single.samples, 1);
    assert!(TimingStats::from_timings(&[], true).is_none());
}

/// Test the discard flag in a run.
///
/// Verifies every timing is counted when discarding is disabled.
#[test]
fn test_discard_first_disabled_run() {
    let result = small().discard_first(false).build().unwrap().run().unwrap();
    assert!(result.reports.iter().all(|r| r.stats.samples == 4));
}

/// Test bandwidth invariance.
///
/// Verifies doubling both bytes and time leaves bandwidth unchanged.
#[test]
fn test_bandwidth_ratio_invariant() {
    let report = |n: usize, seconds: f64| KernelReport {
        kernel: Kernel::Triad,
        bytes_per_call: Kernel::Triad.bytes_moved::<f64>(n),
        timings: vec![seconds],
        stats: TimingStats::from_timings(&[seconds], true).unwrap(),
    };

    let base = report(1 << 20, 1e-3);
    let doubled = report(1 << 21, 2e-3);
    assert_relative_eq!(base.bandwidth(), doubled.bandwidth(), max_relative = 1e-12);
    assert_relative_eq!(base.bandwidth(), 3.0 * 8.0 * (1 << 20) as f64 / 1e-3);
}

/// Test bandwidth units.
///
/// Verifies decimal and binary conversions and labels.
#[test]
fn test_bandwidth_units() {
    let report = KernelReport {
        kernel: Kernel::Copy,
        bytes_per_call: 2_000_000_000,
        timings: vec![1.0],
        stats: TimingStats::from_timings(&[1.0], true).unwrap(),
    };

    assert_relative_eq!(report.bandwidth_in(BandwidthUnit::GigaBytes), 2.0);
    assert_relative_eq!(report.bandwidth_in(BandwidthUnit::MegaBytes), 2000.0);
    assert_relative_eq!(
        report.bandwidth_in(BandwidthUnit::GibiBytes),
        2.0e9 / 1_073_741_824.0
    );
    assert_eq!(BandwidthUnit::MebiBytes.label(), "MiB/s");
    assert_eq!(BandwidthUnit::GibiBytes.to_string(), "GiB/s");
}

/// Test a zero elapsed time.
///
/// Verifies a duration below clock resolution yields infinite bandwidth.
#[test]
fn test_zero_duration_bandwidth() {
    let report = KernelReport {
        kernel: Kernel::Copy,
        bytes_per_call: 1024,
        timings: vec![0.0],
        stats: TimingStats::from_timings(&[0.0], true).unwrap(),
    };
    assert!(report.bandwidth().is_infinite());
}

// ============================================================================
// Output Tests
// ============================================================================

/// Test the result size helpers.
///
/// Verifies array and total byte counts.
#[test]
fn test_result_sizes() {
    let result = small().build().unwrap().run().unwrap();
    assert_eq!(result.array_bytes(), N * 8);
    assert_eq!(result.total_bytes(), 3 * N * 8);
}

/// Test the rendered table.
///
/// Verifies the summary block and one row per kernel.
#[test]
fn test_result_display() {
    let result = small()
        .unit(BandwidthUnit::MebiBytes)
        .build()
        .unwrap()
        .run()
        .unwrap();
    let text = result.to_string();

    assert!(text.contains("Summary:"));
    assert!(text.contains("Verification:   passed"));
    assert!(text.contains("MiB/s"));
    assert!(text.contains("kernel-major"));
    for kernel in KernelSelection::Classic.kernels() {
        assert!(
            text.lines().any(|l| l.starts_with(kernel.name())),
            "missing row for {kernel}"
        );
    }
}
