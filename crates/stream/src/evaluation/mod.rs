//! Layer 3: Evaluation
//!
//! # Purpose
//!
//! This layer judges what a run produced:
//! - Correctness of the final arrays and the last reduction
//! - Timing statistics and achieved bandwidth
//!
//! # Architecture
//!
//! ```text
//! Layer 5: API
//!   ↓
//! Layer 4: Engine
//!   ↓
//! Layer 3: Evaluation ← You are here
//!   ↓
//! Layer 2: Algorithms
//!   ↓
//! Layer 1: Primitives
//! ```

/// Analytic verification of backend results.
pub mod verifier;

/// Timing statistics and bandwidth.
pub mod statistics;
