//! Layer 2: Algorithms
//!
//! # Purpose
//!
//! This layer defines the kernel set and the Kernel Engine contract, and
//! provides the serial reference implementation of that contract.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: API
//!   ↓
//! Layer 4: Engine
//!   ↓
//! Layer 3: Evaluation
//!   ↓
//! Layer 2: Algorithms ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Kernel set, selection, scheduling and the engine contract.
pub mod kernels;

/// Serial reference backend.
pub mod sequential;
