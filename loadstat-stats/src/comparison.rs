//! Run-to-Run Comparison
//!
//! Signed deltas between a report and its counterpart from the previous build.
//! Every delta is `current - previous`; with no counterpart all deltas are zero.

use serde::{Deserialize, Serialize};

/// The statistics of one report that participate in a comparison
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatPoint {
    /// Sample count
    pub size: u64,
    /// Average response time (ms)
    pub average: u64,
    /// Median response time (ms)
    pub median: u64,
    /// Error rate in percent
    pub error_percent: f64,
}

/// Signed difference between two [`StatPoint`]s
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryDelta {
    /// Change in sample count
    pub size: i64,
    /// Change in average (ms)
    pub average: i64,
    /// Change in median (ms)
    pub median: i64,
    /// Change in error rate (percentage points)
    pub error_percent: f64,
}

impl SummaryDelta {
    /// Whether every component is zero
    pub fn is_zero(&self) -> bool {
        self.size == 0 && self.average == 0 && self.median == 0 && self.error_percent == 0.0
    }
}

fn signed_delta(current: u64, previous: u64) -> i64 {
    (current as i128 - previous as i128).clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Compare a report's statistics against its previous-build counterpart.
///
/// Returns an all-zero delta when there is no counterpart.
pub fn compare_points(current: &StatPoint, previous: Option<&StatPoint>) -> SummaryDelta {
    let Some(previous) = previous else {
        return SummaryDelta::default();
    };

    SummaryDelta {
        size: signed_delta(current.size, previous.size),
        average: signed_delta(current.average, previous.average),
        median: signed_delta(current.median, previous.median),
        error_percent: current.error_percent - previous.error_percent,
    }
}
