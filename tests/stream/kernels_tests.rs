//! Tests for the kernel contract and the serial reference backend.
//!
//! These tests verify the per-element semantics every backend must honor:
//! - Single-kernel results after `init_arrays`
//! - The fused `nstream` update
//! - The dot product against `N * x * y`
//! - Readback length checks and allocation failures
//!
//! ## Test Organization
//!
//! 1. **Kernel Semantics** - One kernel after initialization, `f32` and `f64`
//! 2. **Concrete Scenario** - Triad followed by dot at N = 1024
//! 3. **Readback** - Destination length checks
//! 4. **Construction** - Array size validation, device index
//! 5. **Kernel Metadata** - Bytes moved, selection and schedule order

use approx::assert_relative_eq;

use stream::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

const N: usize = 1000;

fn engine<T: StreamFloat>(scalar: f64) -> SerialStream<T> {
    SerialStream::new(N, 0, T::narrow(scalar)).unwrap()
}

fn read<T: StreamFloat>(engine: &SerialStream<T>) -> (Vec<T>, Vec<T>, Vec<T>) {
    let n = engine.array_size();
    let mut a = vec![T::zero(); n];
    let mut b = vec![T::zero(); n];
    let mut c = vec![T::zero(); n];
    engine.read_arrays(&mut a, &mut b, &mut c).unwrap();
    (a, b, c)
}

fn init<T: StreamFloat>(engine: &mut SerialStream<T>) -> (T, T, T) {
    let (x, y, z) = (T::narrow(1.5), T::narrow(-0.75), T::narrow(2.25));
    engine.init_arrays(x, y, z).unwrap();
    (x, y, z)
}

fn check_copy<T: StreamFloat>() {
    let mut e = engine::<T>(0.4);
    let (x, y, _) = init(&mut e);
    e.copy().unwrap();
    let (a, b, c) = read(&e);
    assert!(c.iter().all(|&v| v == x), "copy should set c to x");
    assert!(a.iter().all(|&v| v == x), "copy should leave a unchanged");
    assert!(b.iter().all(|&v| v == y), "copy should leave b unchanged");
}

fn check_mul<T: StreamFloat>() {
    let mut e = engine::<T>(0.4);
    let (_, _, z) = init(&mut e);
    e.mul().unwrap();
    let expected = e.scalar() * z;
    let (_, b, c) = read(&e);
    assert!(b.iter().all(|&v| v == expected), "mul should set b to scalar * z");
    assert!(c.iter().all(|&v| v == z), "mul should leave c unchanged");
}

fn check_add<T: StreamFloat>() {
    let mut e = engine::<T>(0.4);
    let (x, y, _) = init(&mut e);
    e.add().unwrap();
    let (_, _, c) = read(&e);
    assert!(c.iter().all(|&v| v == x + y), "add should set c to x + y");
}

fn check_triad<T: StreamFloat>() {
    let mut e = engine::<T>(0.4);
    let (_, y, z) = init(&mut e);
    e.triad().unwrap();
    let expected = y + e.scalar() * z;
    let (a, _, _) = read(&e);
    assert!(a.iter().all(|&v| v == expected), "triad should set a to y + scalar * z");
}

fn check_nstream<T: StreamFloat>() {
    let mut e = engine::<T>(0.4);
    let (x, y, z) = init(&mut e);
    e.nstream().unwrap();
    let expected = x + y + e.scalar() * z;
    let double_b = x + y + y + e.scalar() * z;
    let (a, b, c) = read(&e);
    assert!(a.iter().all(|&v| v == expected), "nstream should apply b once");
    assert!(a.iter().all(|&v| v != double_b), "nstream must not apply b twice");
    assert!(b.iter().all(|&v| v == y));
    assert!(c.iter().all(|&v| v == z));
}

fn check_dot<T: StreamFloat>() {
    let mut e = engine::<T>(0.4);
    let (x, y, _) = init(&mut e);
    let dot = e.dot().unwrap().widen();
    let expected = N as f64 * (x * y).widen();
    let tol = T::epsilon().widen() * 100.0 + N as f64 * f64::EPSILON;
    assert_relative_eq!(dot, expected, max_relative = tol);
}

// ============================================================================
// Kernel Semantics Tests
// ============================================================================

/// Test copy in both precisions.
///
/// Verifies `c[i] == x` and that the sources are untouched.
#[test]
fn test_copy_sets_c() {
    check_copy::<f32>();
    check_copy::<f64>();
}

/// Test mul in both precisions.
///
/// Verifies `b[i] == scalar * z`.
#[test]
fn test_mul_sets_b() {
    check_mul::<f32>();
    check_mul::<f64>();
}

/// Test add in both precisions.
///
/// Verifies `c[i] == x + y`.
#[test]
fn test_add_sets_c() {
    check_add::<f32>();
    check_add::<f64>();
}

/// Test triad in both precisions.
///
/// Verifies `a[i] == y + scalar * z`.
#[test]
fn test_triad_sets_a() {
    check_triad::<f32>();
    check_triad::<f64>();
}

/// Test nstream in both precisions.
///
/// Verifies the fused update adds `b` exactly once.
#[test]
fn test_nstream_applies_b_once() {
    check_nstream::<f32>();
    check_nstream::<f64>();
}

/// Test dot in both precisions.
///
/// Verifies the reduction equals `N * x * y` within a tolerance scaled to N.
#[test]
fn test_dot_matches_closed_form() {
    check_dot::<f32>();
    check_dot::<f64>();
}

/// Test that `execute` dispatches to the right kernel.
///
/// Verifies that only `Dot` produces a value.
#[test]
fn test_execute_dispatch() {
    let mut e = engine::<f64>(0.4);
    e.init_arrays(0.1, 0.2, 0.0).unwrap();

    for kernel in Kernel::ALL {
        let value = e.execute(kernel).unwrap();
        assert_eq!(value.is_some(), kernel == Kernel::Dot, "{kernel}");
    }
}

/// Test a large domain exercising several dot blocks.
///
/// Verifies the blocked reduction covers a ragged final block.
#[test]
fn test_dot_large_ragged() {
    let n = 3 * 4096 + 17;
    let mut e = SerialStream::<f64>::new(n, 0, 0.4).unwrap();
    e.init_arrays(0.5, 2.0, 0.0).unwrap();
    assert_relative_eq!(e.dot().unwrap(), n as f64, max_relative = 1e-12);
}

// ============================================================================
// Concrete Scenario Tests
// ============================================================================

/// Test triad then dot at N = 1024 in double precision.
///
/// Verifies `a == 0.2` after triad and `dot == 40.96` afterwards.
#[test]
fn test_triad_then_dot_scenario() {
    let mut e = SerialStream::<f64>::new(1024, 0, 0.4).unwrap();
    e.init_arrays(0.1, 0.2, 0.0).unwrap();
    e.triad().unwrap();

    let (a, b, _) = read(&e);
    for &v in &a {
        assert_relative_eq!(v, 0.2, epsilon = 1e-12);
    }
    assert!(b.iter().all(|&v| v == 0.2));

    let dot = e.dot().unwrap();
    assert_relative_eq!(dot, 40.96, epsilon = 1e-9);
}

// ============================================================================
// Readback Tests
// ============================================================================

/// Test readback into a short destination.
///
/// Verifies `SizeMismatch` names the array and leaves buffers untouched.
#[test]
fn test_read_arrays_size_mismatch() {
    let mut e = engine::<f64>(0.4);
    e.init_arrays(1.0, 2.0, 3.0).unwrap();

    let mut a = vec![0.0; N];
    let mut b = vec![0.0; N - 1];
    let mut c = vec![0.0; N];
    let err = e.read_arrays(&mut a, &mut b, &mut c).unwrap_err();

    assert_eq!(
        err,
        StreamError::SizeMismatch {
            array: "b",
            expected: N,
            got: N - 1
        }
    );
    assert!(!err.is_fatal(), "readback errors are recoverable");
    assert!(a.iter().all(|&v| v == 0.0), "no array should be written");
}

/// Test readback into an oversized destination.
///
/// Verifies a longer buffer is rejected rather than partially filled.
#[test]
fn test_read_arrays_oversized() {
    let e = engine::<f32>(0.4);
    let mut a = vec![0.0; N];
    let mut b = vec![0.0; N];
    let mut c = vec![0.0; N + 1];
    let res = e.read_arrays(&mut a, &mut b, &mut c);

    assert!(matches!(
        res,
        Err(StreamError::SizeMismatch { array: "c", .. })
    ));
}

// ============================================================================
// Construction Tests
// ============================================================================

/// Test construction with zero elements.
///
/// Verifies `InvalidArraySize` is returned before any allocation.
#[test]
fn test_zero_array_size_rejected() {
    let res = SerialStream::<f64>::new(0, 0, 0.4);
    assert!(matches!(res, Err(StreamError::InvalidArraySize(0))));
}

/// Test construction larger than the address space can back.
///
/// Verifies the first array reports a fatal `Allocation` error.
#[test]
fn test_allocation_failure() {
    let res = SerialStream::<f64>::new(1 << 44, 0, 0.4);
    let err = res.unwrap_err();
    assert!(matches!(
        err,
        StreamError::Allocation {
            array: "a",
            requested_bytes,
        } if requested_bytes == (1usize << 44) * 8
    ));
    assert!(err.is_fatal());
    assert_eq!(err.exit_code(), 3);
}

/// Test the array store with a byte count beyond `isize::MAX`.
///
/// Verifies the overflowing request fails instead of panicking.
#[cfg(feature = "dev")]
#[test]
fn test_array_store_allocation_overflow() {
    use stream::internals::primitives::buffer::ArrayStore;

    let err = ArrayStore::<f64>::allocate(usize::MAX / 8).unwrap_err();
    assert!(matches!(err, StreamError::Allocation { array: "a", .. }));
    assert!(err.is_fatal());
}

/// Test construction with a non-zero device index.
///
/// Verifies the host backend ignores the index.
#[test]
fn test_device_index_ignored() {
    let e = SerialStream::<f64>::new(16, 3, 0.4).unwrap();
    assert_eq!(e.array_size(), 16);
    assert_eq!(e.backend(), Backend::Serial);
    assert_eq!(e.implementation(), "Serial");
}

/// Test host device queries.
///
/// Verifies a single host device and the fixed sentinels.
#[test]
fn test_host_device_queries() {
    let query = device_query(Backend::Serial).unwrap();
    assert_eq!(query.list_devices(), vec!["Host".to_string()]);
    assert_eq!(query.device_name(0), "Device name unavailable");
    assert_eq!(query.device_driver(0), "Device driver unavailable");
}

// ============================================================================
// Kernel Metadata Tests
// ============================================================================

/// Test the byte count of each kernel.
///
/// Verifies the traffic model: 2, 2, 3, 3, 2 and 4 arrays touched.
#[test]
fn test_bytes_moved() {
    let n = 1 << 10;
    assert_eq!(Kernel::Copy.bytes_moved::<f64>(n), 2 * n * 8);
    assert_eq!(Kernel::Mul.bytes_moved::<f64>(n), 2 * n * 8);
    assert_eq!(Kernel::Add.bytes_moved::<f64>(n), 3 * n * 8);
    assert_eq!(Kernel::Triad.bytes_moved::<f64>(n), 3 * n * 8);
    assert_eq!(Kernel::Dot.bytes_moved::<f64>(n), 2 * n * 8);
    assert_eq!(Kernel::Nstream.bytes_moved::<f32>(n), 4 * n * 4);
}

/// Test the resolved kernel lists.
///
/// Verifies selection order follows the reporting order.
#[test]
fn test_kernel_selection_order() {
    assert_eq!(
        KernelSelection::Classic.kernels(),
        vec![
            Kernel::Copy,
            Kernel::Mul,
            Kernel::Add,
            Kernel::Triad,
            Kernel::Dot
        ]
    );
    assert_eq!(KernelSelection::All.kernels(), Kernel::ALL.to_vec());
    assert_eq!(KernelSelection::TriadOnly.kernels(), vec![Kernel::Triad]);
    assert_eq!(KernelSelection::NstreamOnly.kernels(), vec![Kernel::Nstream]);
}

/// Test the two repetition schedules.
///
/// Verifies kernel-major groups repetitions and interleaved cycles kernels.
#[test]
fn test_schedule_plans() {
    let kernels = [Kernel::Copy, Kernel::Dot];

    assert_eq!(
        Schedule::KernelMajor.plan(&kernels, 2),
        vec![Kernel::Copy, Kernel::Copy, Kernel::Dot, Kernel::Dot]
    );
    assert_eq!(
        Schedule::Interleaved.plan(&kernels, 2),
        vec![Kernel::Copy, Kernel::Dot, Kernel::Copy, Kernel::Dot]
    );
}

/// Test backend name parsing.
///
/// Verifies aliases and the error for an unknown name.
#[test]
fn test_backend_from_str() {
    assert_eq!("serial".parse::<Backend>().unwrap(), Backend::Serial);
    assert_eq!("Rayon".parse::<Backend>().unwrap(), Backend::CPU);
    assert_eq!("wgpu".parse::<Backend>().unwrap(), Backend::GPU);
    assert!(matches!(
        "cuda".parse::<Backend>(),
        Err(StreamError::DeviceUnavailable(_))
    ));
}
