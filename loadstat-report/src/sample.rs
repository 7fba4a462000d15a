//! Samples
//!
//! One measured invocation of an endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-interval counters reported by periodic summarizer lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntervalCounts {
    /// Requests completed in the interval
    pub samples: u64,
    /// Fastest response in the interval (ms)
    pub min: u64,
    /// Slowest response in the interval (ms)
    pub max: u64,
}

/// One measured invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Raw endpoint label or URI as written by the test tool
    pub uri: String,
    /// Response time in milliseconds
    pub duration: u64,
    /// When the request was issued
    pub timestamp: DateTime<Utc>,
    /// Whether the tool recorded the request as successful
    pub successful: bool,
    /// Response code as text (may be non-numeric, e.g. "Non HTTP response code")
    pub http_code: String,
    /// Error percentage (0-100) carried by pre-aggregated summarizer lines
    pub aggregate_error_value: Option<f64>,
    /// Interval counters carried by summarizer lines
    pub interval: Option<IntervalCounts>,
}

impl Sample {
    /// A successful sample with no aggregate data
    pub fn new(uri: impl Into<String>, duration: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            uri: uri.into(),
            duration,
            timestamp,
            successful: true,
            http_code: String::new(),
            aggregate_error_value: None,
            interval: None,
        }
    }

    /// Set the success flag
    pub fn with_success(mut self, successful: bool) -> Self {
        self.successful = successful;
        self
    }

    /// Set the response code
    pub fn with_http_code(mut self, http_code: impl Into<String>) -> Self {
        self.http_code = http_code.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let sample = Sample::new("Home", 120, DateTime::<Utc>::UNIX_EPOCH);
        assert!(sample.successful);
        assert!(sample.http_code.is_empty());
        assert!(sample.aggregate_error_value.is_none());

        let failed = sample.with_success(false).with_http_code("500");
        assert!(!failed.successful);
        assert_eq!(failed.http_code, "500");
    }
}
