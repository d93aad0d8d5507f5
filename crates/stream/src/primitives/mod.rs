//! Layer 1: Primitives
//!
//! # Purpose
//!
//! This layer provides the primitive abstractions, data structures, and
//! constants used throughout the crate. It has zero internal dependencies
//! on the other layers.
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
//! Layer 2: Algorithms
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Shared error types.
pub mod errors;

/// Execution backend selection.
pub mod backend;

/// Element types and benchmark constants.
pub mod element;

/// Host array storage.
pub mod buffer;

/// Kernel iteration domain.
pub mod range;
