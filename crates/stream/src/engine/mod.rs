//! Layer 4: Engine
//!
//! # Purpose
//!
//! This layer orchestrates a benchmark run: it validates the configuration,
//! drives a Kernel Engine through the kernel plan, times every call and
//! assembles the result set.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: API
//!   ↓
//! Layer 4: Engine ← You are here
//!   ↓
//! Layer 3: Evaluation
//!   ↓
//! Layer 2: Algorithms
//!   ↓
//! Layer 1: Primitives
//! ```

/// Benchmark driver and configuration.
pub mod driver;

/// Validation utilities.
pub mod validator;

/// Output types for benchmark runs.
pub mod output;
