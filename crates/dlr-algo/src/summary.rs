//! System-wide aggregation of line stresses.
//!
//! The System Stress Index is the mean of squared normalized stress,
//! `mean((stress / 100)²)`. It is 0 for an idle grid, 1 when every line sits
//! exactly at its rating, and grows superlinearly as lines overload.

use serde::{Deserialize, Serialize};

use crate::stress::round1;

/// Lower edges of the warning, high and overload bands, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandEdges {
    pub medium_pct: f64,
    pub high_pct: f64,
    pub overload_pct: f64,
}

impl Default for BandEdges {
    fn default() -> Self {
        Self {
            medium_pct: 70.0,
            high_pct: 90.0,
            overload_pct: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StressBand {
    Low,
    Medium,
    High,
    Overload,
}

impl StressBand {
    pub fn as_str(self) -> &'static str {
        match self {
            StressBand::Low => "low",
            StressBand::Medium => "medium",
            StressBand::High => "high",
            StressBand::Overload => "overload",
        }
    }
}

impl BandEdges {
    pub fn classify(&self, stress_pct: f64) -> StressBand {
        if stress_pct >= self.overload_pct {
            StressBand::Overload
        } else if stress_pct >= self.high_pct {
            StressBand::High
        } else if stress_pct >= self.medium_pct {
            StressBand::Medium
        } else {
            StressBand::Low
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StressBands {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub overload: usize,
}

impl StressBands {
    pub fn total(&self) -> usize {
        self.low + self.medium + self.high + self.overload
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SystemSummary {
    pub line_count: usize,
    pub ssi: f64,
    pub bands: StressBands,
    pub avg_stress: f64,
    pub max_stress: f64,
}

impl SystemSummary {
    /// Display copy: stresses to one decimal, SSI to three.
    pub fn rounded(&self) -> SystemSummary {
        SystemSummary {
            avg_stress: round1(self.avg_stress),
            max_stress: round1(self.max_stress),
            ssi: (self.ssi * 1000.0).round() / 1000.0,
            ..*self
        }
    }
}

/// Reduce active-line stresses to a summary.
///
/// Non-finite values count as zero stress. An empty input yields the all-zero
/// summary.
pub fn summarize<I>(stresses: I, edges: &BandEdges) -> SystemSummary
where
    I: IntoIterator<Item = f64>,
{
    let mut summary = SystemSummary::default();
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for raw in stresses {
        let stress = if raw.is_finite() { raw } else { 0.0 };
        summary.line_count += 1;
        sum += stress;
        let normalized = stress / 100.0;
        sum_sq += normalized * normalized;
        summary.max_stress = summary.max_stress.max(stress);
        match edges.classify(stress) {
            StressBand::Low => summary.bands.low += 1,
            StressBand::Medium => summary.bands.medium += 1,
            StressBand::High => summary.bands.high += 1,
            StressBand::Overload => summary.bands.overload += 1,
        }
    }
    if summary.line_count > 0 {
        let n = summary.line_count as f64;
        summary.avg_stress = sum / n;
        summary.ssi = sum_sq / n;
    }
    summary
}
