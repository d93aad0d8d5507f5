//! Timing statistics and bandwidth conversion.
//!
//! ## Purpose
//!
//! This module turns per-repetition elapsed times into summary statistics and
//! achieved memory bandwidth.
//!
//! ## Key concepts
//!
//! * **Best case**: Bandwidth is computed from the minimum elapsed time.
//! * **Warm-up**: The first repetition may be excluded from the statistics
//!   when more than one repetition was run.
//!
//! ## Invariants
//!
//! * `min <= mean <= max` for every non-empty sample.
//! * Bandwidth depends only on bytes per call and time per call, so scaling
//!   both by the same factor leaves it unchanged.

// External dependencies
use core::fmt::{Display, Formatter, Result as FmtResult};

// Internal dependencies
use crate::algorithms::kernels::Kernel;

// ============================================================================
// Bandwidth Units
// ============================================================================

/// Unit in which bandwidth is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandwidthUnit {
    /// 10^6 bytes per second.
    MegaBytes,

    /// 2^20 bytes per second.
    MebiBytes,

    /// 10^9 bytes per second.
    #[default]
    GigaBytes,

    /// 2^30 bytes per second.
    GibiBytes,
}

impl BandwidthUnit {
    /// Bytes per unit.
    pub fn divisor(&self) -> f64 {
        match self {
            Self::MegaBytes => 1.0e6,
            Self::MebiBytes => 1_048_576.0,
            Self::GigaBytes => 1.0e9,
            Self::GibiBytes => 1_073_741_824.0,
        }
    }

    /// Short label, e.g. `"GB/s"`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MegaBytes => "MB/s",
            Self::MebiBytes => "MiB/s",
            Self::GigaBytes => "GB/s",
            Self::GibiBytes => "GiB/s",
        }
    }

    /// Convert bytes per second into this unit.
    pub fn convert(&self, bytes_per_second: f64) -> f64 {
        bytes_per_second / self.divisor()
    }
}

impl Display for BandwidthUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.label())
    }
}

/// Bytes per second for `bytes` moved in `seconds`.
///
/// A zero duration (below clock resolution) yields infinity.
pub fn bandwidth(bytes: usize, seconds: f64) -> f64 {
    if seconds > 0.0 {
        bytes as f64 / seconds
    } else {
        f64::INFINITY
    }
}

// ============================================================================
// Timing Statistics
// ============================================================================

/// Summary of the elapsed times of one kernel, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingStats {
    /// Fastest repetition.
    pub min: f64,
    /// Slowest repetition.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Number of repetitions the statistics cover.
    pub samples: usize,
}

impl TimingStats {
    /// Summarize `timings`, skipping the first one if `discard_first` and
    /// more than one timing exists. Returns `None` for an empty slice.
    pub fn from_timings(timings: &[f64], discard_first: bool) -> Option<Self> {
        let counted = if discard_first && timings.len() > 1 {
            &timings[1..]
        } else {
            timings
        };
        if counted.is_empty() {
            return None;
        }

        let (min, max, sum) = counted.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(min, max, sum), &t| (min.min(t), max.max(t), sum + t),
        );

        Some(Self {
            min,
            max,
            mean: sum / counted.len() as f64,
            samples: counted.len(),
        })
    }
}

// ============================================================================
// Kernel Report
// ============================================================================

/// Measurements of one kernel over a run.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelReport {
    /// Kernel measured.
    pub kernel: Kernel,
    /// Bytes moved by one call.
    pub bytes_per_call: usize,
    /// Raw elapsed time of every repetition, in seconds, in execution order.
    pub timings: Vec<f64>,
    /// Summary statistics.
    pub stats: TimingStats,
}

impl KernelReport {
    /// Best-case bandwidth in bytes per second.
    pub fn bandwidth(&self) -> f64 {
        bandwidth(self.bytes_per_call, self.stats.min)
    }

    /// Best-case bandwidth in `unit`.
    pub fn bandwidth_in(&self, unit: BandwidthUnit) -> f64 {
        unit.convert(self.bandwidth())
    }

    /// Bandwidth at the mean elapsed time in bytes per second.
    pub fn mean_bandwidth(&self) -> f64 {
        bandwidth(self.bytes_per_call, self.stats.mean)
    }
}
