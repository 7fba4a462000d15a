//! Percentile Computation
//!
//! Computes percentile lines from raw response times using the nearest-rank policy:
//! the sample at index `floor(N * p / 100)` of the ascending sequence.
//!
//! `p = 100` lands one past the last element; the index is clamped to `N - 1`
//! so the 100th percentile is the maximum.

use thiserror::Error;

/// Errors from the checked percentile entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PercentileError {
    /// No samples to rank
    #[error("cannot rank an empty sample set")]
    Empty,
    /// Requested percentile is above 100
    #[error("percentile {0} is outside 0..=100")]
    OutOfRange(u32),
}

/// Index of the nearest-rank percentile within a sorted sequence of `len` samples.
///
/// Rejects empty sequences and percentiles above 100. `percentile == 100`
/// is clamped to the last valid index.
pub fn nearest_rank_index(len: usize, percentile: u32) -> Result<usize, PercentileError> {
    if len == 0 {
        return Err(PercentileError::Empty);
    }
    if percentile > 100 {
        return Err(PercentileError::OutOfRange(percentile));
    }

    let index = len * percentile as usize / 100;
    Ok(index.min(len - 1))
}

/// Compute a single percentile line from samples sorted ascending.
///
/// Returns 0 for an empty slice. Percentiles above 100 are treated as 100.
///
/// # Examples
///
/// ```ignore
/// # use loadstat_stats::compute_percentile;
/// let sorted = vec![50, 100, 200, 300];
/// assert_eq!(compute_percentile(&sorted, 50), 200);
/// assert_eq!(compute_percentile(&sorted, 100), 300);
/// ```
pub fn compute_percentile(sorted: &[u64], percentile: u32) -> u64 {
    match nearest_rank_index(sorted.len(), percentile.min(100)) {
        Ok(index) => sorted[index],
        Err(_) => 0,
    }
}
