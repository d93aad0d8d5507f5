//! Execution backend selection.
//!
//! ## Purpose
//!
//! This module defines the `Backend` enum used to select a Kernel Engine at
//! construction time. The core `stream` crate only implements the serial
//! reference backend; parallel and device backends live in extension crates
//! (like `fastStream`) which install an engine factory keyed on this enum.
//!
//! ## Invariants
//!
//! * The default backend is always `Serial` in the core crate.
//! * Names round-trip through `Display` and `FromStr` (lowercase).

// External dependencies
use core::fmt::{Display, Formatter, Result as FmtResult};
use core::str::FromStr;

// Internal dependencies
use crate::primitives::errors::StreamError;

/// Execution backend identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[allow(clippy::upper_case_acronyms)]
pub enum Backend {
    /// Single-threaded reference implementation.
    #[default]
    Serial,

    /// Host-parallel execution (requires an extension crate with rayon support).
    CPU,

    /// Device offload (requires an extension crate with GPU support).
    GPU,
}

impl Backend {
    /// Lowercase backend name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Serial => "serial",
            Self::CPU => "cpu",
            Self::GPU => "gpu",
        }
    }

    /// Whether the backend exposes more than one selectable device.
    pub fn has_devices(&self) -> bool {
        matches!(self, Self::GPU)
    }
}

impl Display for Backend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.pad(self.name())
    }
}

impl FromStr for Backend {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "serial" | "sequential" => Ok(Self::Serial),
            "cpu" | "parallel" | "rayon" => Ok(Self::CPU),
            "gpu" | "wgpu" => Ok(Self::GPU),
            other => Err(StreamError::DeviceUnavailable(format!(
                "unknown backend '{other}'"
            ))),
        }
    }
}
