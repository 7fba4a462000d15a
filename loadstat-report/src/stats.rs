//! Shared statistics contract
//!
//! Runs and endpoints store data differently (raw samples, one summarizer sample,
//! or pre-aggregated fields) but expose the same accessors to the classifier,
//! the diff linker and the output layer.

use loadstat_stats::{DurationSummary, StatPoint};

/// Statistic accessors shared by every report level
pub trait ReportStats {
    /// Number of samples the report represents
    fn size(&self) -> usize;

    /// Number of failed samples
    fn count_errors(&self) -> u64;

    /// Error rate. Scale depends on the input format, see the format docs.
    fn error_percent(&self) -> f64;

    /// Truncating average response time (ms)
    fn average(&self) -> u64;

    /// Median response time (ms)
    fn median(&self) -> u64;

    /// 90th percentile response time (ms)
    fn ninety_line(&self) -> u64;

    /// Arbitrary percentile line, `None` when the report only carries aggregates
    fn percentile_line(&self, percentile: u32) -> Option<u64>;

    /// Fastest response (ms)
    fn min(&self) -> u64;

    /// Slowest response (ms)
    fn max(&self) -> u64;

    /// Distinct response codes, comma separated in first-seen order
    fn http_code(&self) -> String;

    /// Whether any error was recorded
    fn is_failed(&self) -> bool {
        self.count_errors() != 0
    }

    /// Duration summary built from the individual accessors
    fn summary(&self) -> DurationSummary {
        DurationSummary {
            count: self.size(),
            average: self.average(),
            median: self.median(),
            p90: self.ninety_line(),
            min: self.min(),
            max: self.max(),
        }
    }

    /// The values compared against a previous run
    fn stat_point(&self) -> StatPoint {
        StatPoint {
            size: self.size() as u64,
            average: self.average(),
            median: self.median(),
            error_percent: self.error_percent(),
        }
    }
}

/// Join distinct codes in first-seen order
pub(crate) fn join_distinct_codes<'a>(codes: impl IntoIterator<Item = &'a str>) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for code in codes {
        if !code.is_empty() && !seen.contains(&code) {
            seen.push(code);
        }
    }
    seen.join(",")
}

/// Percent of `errors` over `size`, 0 for an empty report
pub(crate) fn percent_of(errors: f64, size: usize) -> f64 {
    if size == 0 {
        0.0
    } else {
        errors / size as f64 * 100.0
    }
}
