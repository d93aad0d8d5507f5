//! # fastStream: Parallel and GPU Memory Bandwidth Benchmark
//!
//! Accelerated backends for the [`stream`] benchmark: a rayon host-parallel
//! backend (feature `cpu`, default) and a wgpu compute backend (feature
//! `gpu`). Both satisfy the same Kernel Engine contract as the serial
//! reference, so results and bandwidth figures are directly comparable.
//!
//! ## Quick Start
//!
//! ```rust
//! use fastStream::prelude::*;
//!
//! let mut bench = Stream::<f64>::new()
//!     .array_size(1 << 18)
//!     .repetitions(20)
//!     .backend(CPU)
//!     .build()?;
//!
//! let result = bench.run()?;
//! let triad = result.report(Kernel::Triad).expect("triad is in the classic set");
//! println!("Triad: {:.2} GB/s", triad.bandwidth_in(BandwidthUnit::GigaBytes));
//! # Result::<(), StreamError>::Ok(())
//! ```
//!
//! ## Backends
//!
//! | Backend  | Feature | Element types | Device index        |
//! |----------|---------|---------------|---------------------|
//! | `Serial` | n/a     | `f32`, `f64`  | ignored             |
//! | `CPU`    | `cpu`   | `f32`, `f64`  | ignored             |
//! | `GPU`    | `gpu`   | `f32`         | selects the adapter |
//!
//! Use [`prelude::device_query`] to list the devices a backend can run on.
//!
//! ## Reading arrays back
//!
//! [`prelude::read_arrays_into`] accepts slices, vectors and contiguous
//! `ndarray` 1-D arrays as destinations.

#![allow(non_snake_case)]

/// GPU-accelerated execution engine.
#[cfg(feature = "gpu")]
pub mod gpu {
    pub use crate::engine::gpu::{GpuDevices, GpuStream};
}

/// Rayon execution engine.
#[cfg(feature = "cpu")]
pub mod cpu {
    pub use crate::engine::executor::ParallelStream;
}

// Layer 4: Engine - accelerated Kernel Engines and the factory.
mod engine;

// High-level fluent API for benchmark runs.
mod api;

// Host readback destinations.
mod host;

// Standard fastStream prelude.
pub mod prelude {
    pub use crate::api::{
        BandwidthUnit,
        Backend::{self, CPU, GPU, Serial},
        BenchmarkResult, DeviceQuery, DriverState, InitValues, Kernel, KernelReport,
        KernelSelection, Location, ParallelStreamBuilder as Stream, Schedule, StreamBenchmark,
        StreamEngine, StreamError, StreamFloat, TimingStats,
    };
    pub use crate::engine::{create_engine, device_query};
    pub use crate::host::{HostBuffer, read_arrays_into, read_arrays_ndarray};
}

// Internal modules for development and testing.
//
// This module re-exports internal modules for development and testing purposes.
// It is only available with the `dev` feature enabled.
#[cfg(feature = "dev")]
pub mod internals {
    pub mod engine {
        pub use crate::engine::*;
    }
    pub mod api {
        pub use crate::api::*;
    }
    pub mod host {
        pub use crate::host::*;
    }
}
