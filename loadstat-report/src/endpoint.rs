//! Endpoint Reports
//!
//! All results for one logical endpoint (URI or test case) within one report file.

use crate::sample::Sample;
use crate::stats::{ReportStats, join_distinct_codes, percent_of};
use loadstat_stats::{
    DurationSummary, MEDIAN_PERCENTILE, NINETY_LINE_PERCENTILE, compute_percentile,
    compute_summary,
};
use serde::{Deserialize, Serialize};

/// Display URIs longer than this are shortened by [`EndpointReport::short_uri`]
pub const SHORT_URI_LIMIT: usize = 130;

/// Pre-aggregated statistics supplied verbatim by an aggregate report row
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateFields {
    /// Sample count
    pub count: u64,
    /// Average response time (ms)
    pub average: u64,
    /// Median response time (ms)
    pub median: u64,
    /// 90th percentile response time (ms)
    pub p90: u64,
    /// Fastest response (ms)
    pub min: u64,
    /// Slowest response (ms)
    pub max: u64,
    /// Failed share of requests, 0.0 to 1.0
    pub error_fraction: f64,
}

impl AggregateFields {
    /// Failed requests implied by the count and fraction, truncated
    pub fn count_errors(&self) -> u64 {
        (self.count as f64 * self.error_fraction) as u64
    }

    /// Error rate on the 0-100 scale
    pub fn error_percent(&self) -> f64 {
        self.error_fraction * 100.0
    }
}

/// How an endpoint stores its data
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointBody {
    /// Raw per-request samples in arrival order
    Samples(Vec<Sample>),
    /// The single sample synthesized from the latest summarizer line
    Summarizer(Sample),
    /// Values supplied by an aggregate report row
    Aggregate(AggregateFields),
}

/// Report for one endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointReport {
    key: String,
    display_uri: String,
    body: EndpointBody,
}

impl EndpointReport {
    /// Create an endpoint that collects raw samples
    pub fn with_samples(key: impl Into<String>, display_uri: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_uri: display_uri.into(),
            body: EndpointBody::Samples(Vec::new()),
        }
    }

    /// Create an endpoint backed by one summarizer sample
    pub fn with_summarizer_sample(key: impl Into<String>, sample: Sample) -> Self {
        Self {
            key: key.into(),
            display_uri: sample.uri.clone(),
            body: EndpointBody::Summarizer(sample),
        }
    }

    /// Create an endpoint from an aggregate row
    pub fn with_aggregate(
        key: impl Into<String>,
        display_uri: impl Into<String>,
        fields: AggregateFields,
    ) -> Self {
        Self {
            key: key.into(),
            display_uri: display_uri.into(),
            body: EndpointBody::Aggregate(fields),
        }
    }

    /// Sanitized key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// URI as first written by the test tool
    pub fn display_uri(&self) -> &str {
        &self.display_uri
    }

    /// Display URI cut to 129 characters when it exceeds the display limit
    pub fn short_uri(&self) -> &str {
        if self.display_uri.chars().count() > SHORT_URI_LIMIT {
            let end = self
                .display_uri
                .char_indices()
                .nth(SHORT_URI_LIMIT - 1)
                .map(|(i, _)| i)
                .unwrap_or(self.display_uri.len());
            &self.display_uri[..end]
        } else {
            &self.display_uri
        }
    }

    /// Storage variant
    pub fn body(&self) -> &EndpointBody {
        &self.body
    }

    /// Samples in arrival order (empty for aggregate endpoints)
    pub fn samples(&self) -> &[Sample] {
        match &self.body {
            EndpointBody::Samples(samples) => samples,
            EndpointBody::Summarizer(sample) => std::slice::from_ref(sample),
            EndpointBody::Aggregate(_) => &[],
        }
    }

    /// Aggregate values, if this endpoint came from an aggregate row
    pub fn aggregate(&self) -> Option<&AggregateFields> {
        match &self.body {
            EndpointBody::Aggregate(fields) => Some(fields),
            _ => None,
        }
    }

    /// Durations sorted ascending
    pub fn sorted_durations(&self) -> Vec<u64> {
        let mut durations: Vec<u64> = self.samples().iter().map(|s| s.duration).collect();
        durations.sort_unstable();
        durations
    }

    /// Summed summarizer error percentages (0 for other bodies)
    pub(crate) fn aggregate_error_total(&self) -> f64 {
        self.samples()
            .iter()
            .filter_map(|s| s.aggregate_error_value)
            .sum()
    }

    /// Append a raw sample. Returns `false` if the body does not hold raw samples.
    pub(crate) fn push_sample(&mut self, sample: Sample) -> bool {
        match &mut self.body {
            EndpointBody::Samples(samples) => {
                samples.push(sample);
                true
            }
            _ => false,
        }
    }

    /// Overwrite the summarizer sample. Returns `false` for other bodies.
    pub(crate) fn replace_summarizer_sample(&mut self, sample: Sample) -> bool {
        match &mut self.body {
            EndpointBody::Summarizer(current) => {
                *current = sample;
                true
            }
            _ => false,
        }
    }
}

pub(crate) fn checked_percentile(sorted: &[u64], percentile: u32) -> u64 {
    if percentile > 100 {
        tracing::warn!(percentile, "percentile above 100 requested, using 100");
    }
    compute_percentile(sorted, percentile)
}

impl ReportStats for EndpointReport {
    fn size(&self) -> usize {
        match &self.body {
            EndpointBody::Samples(samples) => samples.len(),
            EndpointBody::Summarizer(_) => 1,
            EndpointBody::Aggregate(fields) => fields.count as usize,
        }
    }

    fn count_errors(&self) -> u64 {
        match &self.body {
            EndpointBody::Samples(_) | EndpointBody::Summarizer(_) => {
                self.samples().iter().filter(|s| !s.successful).count() as u64
            }
            EndpointBody::Aggregate(fields) => fields.count_errors(),
        }
    }

    fn error_percent(&self) -> f64 {
        match &self.body {
            // The summariser's own percentage only feeds the run-level total
            EndpointBody::Samples(_) | EndpointBody::Summarizer(_) => {
                percent_of(self.count_errors() as f64, self.size())
            }
            EndpointBody::Aggregate(fields) => fields.error_percent(),
        }
    }

    fn average(&self) -> u64 {
        self.summary().average
    }

    fn median(&self) -> u64 {
        match &self.body {
            EndpointBody::Aggregate(fields) => fields.median,
            _ => checked_percentile(&self.sorted_durations(), MEDIAN_PERCENTILE),
        }
    }

    fn ninety_line(&self) -> u64 {
        match &self.body {
            EndpointBody::Aggregate(fields) => fields.p90,
            _ => checked_percentile(&self.sorted_durations(), NINETY_LINE_PERCENTILE),
        }
    }

    fn percentile_line(&self, percentile: u32) -> Option<u64> {
        match &self.body {
            EndpointBody::Aggregate(_) => None,
            _ => Some(checked_percentile(&self.sorted_durations(), percentile)),
        }
    }

    fn min(&self) -> u64 {
        self.summary().min
    }

    fn max(&self) -> u64 {
        self.summary().max
    }

    fn http_code(&self) -> String {
        join_distinct_codes(self.samples().iter().map(|s| s.http_code.as_str()))
    }

    fn summary(&self) -> DurationSummary {
        match &self.body {
            EndpointBody::Aggregate(fields) => DurationSummary {
                count: fields.count as usize,
                average: fields.average,
                median: fields.median,
                p90: fields.p90,
                min: fields.min,
                max: fields.max,
            },
            _ => {
                let durations: Vec<u64> = self.samples().iter().map(|s| s.duration).collect();
                compute_summary(&durations)
            }
        }
    }
}
