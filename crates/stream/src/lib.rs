//! # stream: Memory Bandwidth Benchmark for Rust
//!
//! A backend-agnostic implementation of the STREAM family of memory
//! bandwidth kernels. Every backend runs the same fixed kernel set over three
//! arrays of the same length; the harness times each call, converts the
//! elapsed time into achieved bandwidth, and verifies the final state
//! analytically.
//!
//! ## What is measured?
//!
//! | Kernel    | Operation                       | Bytes per call     |
//! |-----------|---------------------------------|--------------------|
//! | `Copy`    | `c[i] = a[i]`                   | `2 * N * sizeof(T)`|
//! | `Mul`     | `b[i] = scalar * c[i]`          | `2 * N * sizeof(T)`|
//! | `Add`     | `c[i] = a[i] + b[i]`            | `3 * N * sizeof(T)`|
//! | `Triad`   | `a[i] = b[i] + scalar * c[i]`   | `3 * N * sizeof(T)`|
//! | `Dot`     | `sum(a[i] * b[i])`              | `2 * N * sizeof(T)`|
//! | `Nstream` | `a[i] += b[i] + scalar * c[i]`  | `4 * N * sizeof(T)`|
//!
//! Bandwidth is reported from the fastest repetition of each kernel.
//!
//! ## Quick Start
//!
//! ```rust
//! use stream::prelude::*;
//!
//! let mut bench = Stream::<f64>::new()
//!     .array_size(1 << 16)
//!     .repetitions(10)
//!     .kernels(KernelSelection::All)
//!     .build()?;
//!
//! let result = bench.run()?;
//! assert!(result.verified);
//!
//! let triad = result.report(Kernel::Triad).expect("triad was selected");
//! assert_eq!(triad.bytes_per_call, 3 * (1 << 16) * 8);
//!
//! println!("{}", result);
//! # Result::<(), StreamError>::Ok(())
//! ```
//!
//! ```text
//! Summary:
//!   Implementation: Serial
//!   Backend:        serial
//!   Precision:      double
//!   Array size:     65536 elements (0.5 MB)
//!   Total size:     1.6 MB
//!   Repetitions:    10 (kernel-major)
//!   Verification:   passed
//!   Last dot:       1310.72
//!
//! Function           GB/s    Min (sec)          Max      Average
//! --------------------------------------------------------------
//! Copy             21.544      0.00005      0.00006      0.00005
//! ...
//! ```
//!
//! ## Backends
//!
//! This crate ships the serial reference backend. The `fastStream` crate adds
//! a rayon host-parallel backend and a wgpu compute backend and installs
//! them into the builder.
//!
//! ## Writing a backend
//!
//! Implement [`prelude::StreamEngine`] for your type and pass it to
//! [`prelude::StreamBenchmark::run_on`]. The driver times every call and the
//! verifier checks the final state, so a backend only has to implement the
//! kernels.
//!
//! ## Logging
//!
//! Progress is reported through `tracing`: engine construction and run
//! completion at `info`, a per-kernel summary at `debug`, every repetition
//! at `trace`, and verification failures at `error`. Install any subscriber
//! to see them.

// Layer 1: Primitives - data structures and basic utilities.
mod primitives;

// Layer 2: Algorithms - kernel contract and serial backend.
mod algorithms;

// Layer 3: Evaluation - verification and statistics.
mod evaluation;

// Layer 4: Engine - orchestration and result assembly.
mod engine;

// High-level fluent API for benchmark runs.
mod api;

// Standard stream prelude.
pub mod prelude {
    pub use crate::algorithms::kernels::StreamEngine;
    pub use crate::algorithms::sequential::{HostDevices, SerialStream};
    pub use crate::api::{
        BandwidthUnit, Backend, BenchmarkResult, DeviceQuery, DriverState, InitValues, Kernel,
        KernelReport, KernelSelection, Location, Schedule, StreamBenchmark,
        StreamBuilder as Stream, StreamError, StreamFloat, TimingStats, device_query,
    };
    pub use crate::engine::driver::{BenchmarkConfig, BenchmarkDriver};
    pub use crate::evaluation::verifier::{ExpectedState, Verifier};
}

// Internal modules for development and testing.
//
// This module re-exports internal modules for development and testing purposes.
// It is only available with the `dev` feature enabled.
#[cfg(feature = "dev")]
pub mod internals {
    pub mod primitives {
        pub use crate::primitives::*;
    }
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    pub mod evaluation {
        pub use crate::evaluation::*;
    }
    pub mod engine {
        pub use crate::engine::*;
    }
    pub mod api {
        pub use crate::api::*;
    }
}
