//! Summary Statistics
//!
//! Summarizes a set of response times the way every report level reads them:
//! - Average is the integer sum divided by the count, truncating
//! - Median and 90% line use the nearest-rank percentile policy
//! - Min and max are the extrema of the same set
//!
//! A run's summary is computed over the flattened samples of all of its
//! endpoints, never by recombining per-endpoint averages.

use crate::percentiles::compute_percentile;
use crate::{MEDIAN_PERCENTILE, NINETY_LINE_PERCENTILE};
use serde::{Deserialize, Serialize};

/// Summary of one sample set, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DurationSummary {
    /// Number of samples
    pub count: usize,
    /// Truncating integer average
    pub average: u64,
    /// 50th percentile
    pub median: u64,
    /// 90th percentile
    pub p90: u64,
    /// Fastest sample
    pub min: u64,
    /// Slowest sample
    pub max: u64,
}

/// Integer average of the given durations, truncating toward zero.
///
/// Returns 0 for an empty set.
pub fn truncating_average(durations: &[u64]) -> u64 {
    if durations.is_empty() {
        return 0;
    }
    let total: u128 = durations.iter().map(|&d| d as u128).sum();
    (total / durations.len() as u128) as u64
}

/// Compute summary statistics for unsorted durations
pub fn compute_summary(durations: &[u64]) -> DurationSummary {
    if durations.is_empty() {
        return DurationSummary::default();
    }

    let mut sorted = durations.to_vec();
    sorted.sort_unstable();

    DurationSummary {
        count: sorted.len(),
        average: truncating_average(&sorted),
        median: compute_percentile(&sorted, MEDIAN_PERCENTILE),
        p90: compute_percentile(&sorted, NINETY_LINE_PERCENTILE),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    }
}
