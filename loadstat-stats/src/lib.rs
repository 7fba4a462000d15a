#![warn(missing_docs)]
//! Loadstat Statistical Engine
//!
//! Statistics over millisecond response times collected by load and unit tests:
//! - Nearest-rank percentile lines (`floor(N * p / 100)`, clamped to the last sample)
//! - Truncating integer average, min and max
//! - Signed deltas between a run and its predecessor

mod comparison;
mod percentiles;
mod summary;

pub use comparison::{StatPoint, SummaryDelta, compare_points};
pub use percentiles::{PercentileError, compute_percentile, nearest_rank_index};
pub use summary::{DurationSummary, compute_summary, truncating_average};

/// Percentile used for the median line
pub const MEDIAN_PERCENTILE: u32 = 50;

/// Percentile used for the "90% line" that SLA checks read
pub const NINETY_LINE_PERCENTILE: u32 = 90;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(MEDIAN_PERCENTILE, 50);
        assert_eq!(NINETY_LINE_PERCENTILE, 90);
    }
}
