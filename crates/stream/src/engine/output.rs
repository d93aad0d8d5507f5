//! Result set of a benchmark run.
//!
//! ## Purpose
//!
//! This module defines [`BenchmarkResult`], the structured output of the
//! driver: run metadata plus one [`KernelReport`] per selected kernel.
//!
//! ## Design notes
//!
//! * **Structured first**: Callers read the fields directly; `Display` is a
//!   convenience summary table, not a reporting layer.
//! * **Ordering**: Reports are stored in kernel selection order.
//!
//! ## Non-goals
//!
//! * This module does not provide CSV or machine-readable rendering.
//! * This module does not perform calculations beyond unit conversion.

// External dependencies
use core::fmt::{Display, Formatter, Result};

// Internal dependencies
use crate::algorithms::kernels::{Kernel, Schedule};
use crate::evaluation::statistics::{BandwidthUnit, KernelReport};
use crate::primitives::backend::Backend;
use crate::primitives::element::StreamFloat;

// ============================================================================
// Result Structure
// ============================================================================

/// Structured output of one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult<T> {
    /// Engine implementation string.
    pub implementation: String,

    /// Backend that ran the kernels.
    pub backend: Backend,

    /// `"float"` or `"double"`.
    pub precision: &'static str,

    /// Size of one element in bytes.
    pub element_bytes: usize,

    /// Elements per array.
    pub array_size: usize,

    /// Repetitions of every kernel.
    pub repetitions: usize,

    /// Order in which repetitions were issued.
    pub schedule: Schedule,

    /// Unit used by `Display`.
    pub unit: BandwidthUnit,

    /// Whether the final state was verified.
    pub verified: bool,

    /// Value returned by the last `dot` call, if any ran.
    pub dot: Option<T>,

    /// Per-kernel measurements in selection order.
    pub reports: Vec<KernelReport>,
}

impl<T> BenchmarkResult<T> {
    /// Measurements of `kernel`, if it was selected.
    pub fn report(&self, kernel: Kernel) -> Option<&KernelReport> {
        self.reports.iter().find(|r| r.kernel == kernel)
    }

    /// Bytes held by one array.
    pub fn array_bytes(&self) -> usize {
        self.array_size * self.element_bytes
    }

    /// Bytes held by all three arrays.
    pub fn total_bytes(&self) -> usize {
        3 * self.array_bytes()
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

impl<T: StreamFloat> Display for BenchmarkResult<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let unit = self.unit;
        // Sizes use the same decimal/binary base as the bandwidth unit.
        let size_divisor = match unit {
            BandwidthUnit::MegaBytes | BandwidthUnit::MebiBytes => unit.divisor(),
            BandwidthUnit::GigaBytes => 1.0e6,
            BandwidthUnit::GibiBytes => 1_048_576.0,
        };
        let size_label = match unit {
            BandwidthUnit::MegaBytes | BandwidthUnit::GigaBytes => "MB",
            BandwidthUnit::MebiBytes | BandwidthUnit::GibiBytes => "MiB",
        };

        writeln!(f, "Summary:")?;
        writeln!(f, "  Implementation: {}", self.implementation)?;
        writeln!(f, "  Backend:        {}", self.backend)?;
        writeln!(f, "  Precision:      {}", self.precision)?;
        writeln!(
            f,
            "  Array size:     {} elements ({:.1} {size_label})",
            self.array_size,
            self.array_bytes() as f64 / size_divisor
        )?;
        writeln!(
            f,
            "  Total size:     {:.1} {size_label}",
            self.total_bytes() as f64 / size_divisor
        )?;
        writeln!(
            f,
            "  Repetitions:    {} ({})",
            self.repetitions, self.schedule
        )?;
        writeln!(
            f,
            "  Verification:   {}",
            if self.verified { "passed" } else { "skipped" }
        )?;
        if let Some(dot) = self.dot {
            writeln!(f, "  Last dot:       {dot}")?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:<10} {:>12} {:>12} {:>12} {:>12}",
            "Function",
            unit.label(),
            "Min (sec)",
            "Max",
            "Average"
        )?;
        writeln!(f, "{:-<62}", "")?;
        for report in &self.reports {
            writeln!(
                f,
                "{:<10} {:>12.3} {:>12.5} {:>12.5} {:>12.5}",
                report.kernel.name(),
                report.bandwidth_in(unit),
                report.stats.min,
                report.stats.max,
                report.stats.mean
            )?;
        }

        Ok(())
    }
}
