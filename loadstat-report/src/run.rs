//! Run Reports
//!
//! Everything parsed from one input file: an ordered set of endpoint reports plus,
//! for aggregate inputs, the run-level totals row.
//!
//! ## Lifecycle
//!
//! ```text
//!   parser ──add_sample / put_summarizer_sample / add_aggregate──▶ RunReport
//!                                                                    │
//!                                         link_previous (once) ◀─────┘
//!                                                                    │
//!                                                   Arc<RunReport>, read-only
//! ```
//!
//! The previous run is held through a `Weak`; endpoint counterparts are looked up by
//! key in the previous run when a diff is requested. Dropping the previous build's
//! reports turns every diff back into zero.

use crate::endpoint::{AggregateFields, EndpointReport, checked_percentile};
use crate::error::ReportError;
use crate::key::sanitize_key;
use crate::sample::Sample;
use crate::stats::{ReportStats, percent_of};
use fxhash::FxHashMap;
use loadstat_stats::{
    DurationSummary, MEDIAN_PERCENTILE, NINETY_LINE_PERCENTILE, SummaryDelta, compare_points,
    compute_summary,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};

/// Which family of input produced a run, which decides its error accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Raw per-request traces. Error percent is failed / size * 100.
    Standard,
    /// Periodic summarizer lines. Error percent is the summed per-endpoint
    /// percentages divided by size, without further scaling.
    Summarizer,
    /// Pre-aggregated rows. Run statistics come verbatim from the `TOTAL` row.
    Aggregate,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Standard => write!(f, "standard"),
            ReportFormat::Summarizer => write!(f, "summarizer"),
            ReportFormat::Aggregate => write!(f, "aggregate"),
        }
    }
}

/// Report for one input file
#[derive(Debug, Clone)]
pub struct RunReport {
    source_file_name: String,
    format: ReportFormat,
    endpoints: Vec<EndpointReport>,
    index: FxHashMap<String, usize>,
    totals: AggregateFields,
    previous: Option<Weak<RunReport>>,
}

impl RunReport {
    /// Create an empty report
    pub fn new(source_file_name: impl Into<String>, format: ReportFormat) -> Self {
        Self {
            source_file_name: source_file_name.into(),
            format,
            endpoints: Vec::new(),
            index: FxHashMap::default(),
            totals: AggregateFields::default(),
            previous: None,
        }
    }

    /// Name of the file the report was parsed from
    pub fn source_file_name(&self) -> &str {
        &self.source_file_name
    }

    /// Input format
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    fn expect_format(&self, expected: ReportFormat) -> Result<(), ReportError> {
        if self.format == expected {
            Ok(())
        } else {
            Err(ReportError::FormatMismatch {
                expected,
                actual: self.format,
            })
        }
    }

    /// Append a raw sample to the endpoint keyed by its sanitized URI.
    pub fn add_sample(&mut self, sample: Sample) -> Result<(), ReportError> {
        self.expect_format(ReportFormat::Standard)?;
        if sample.uri.is_empty() {
            return Err(ReportError::EmptyLabel);
        }

        let key = sanitize_key(&sample.uri);
        let position = match self.index.get(&key) {
            Some(&position) => position,
            None => {
                let endpoint = EndpointReport::with_samples(key.clone(), sample.uri.clone());
                self.insert_endpoint(key, endpoint)
            }
        };
        self.endpoints[position].push_sample(sample);
        Ok(())
    }

    /// Store the summarizer sample for its endpoint, replacing any earlier one.
    pub fn put_summarizer_sample(&mut self, sample: Sample) -> Result<(), ReportError> {
        self.expect_format(ReportFormat::Summarizer)?;
        if sample.uri.is_empty() {
            return Err(ReportError::EmptyLabel);
        }

        let key = sanitize_key(&sample.uri);
        match self.index.get(&key) {
            Some(&position) => {
                tracing::debug!(key = %key, "summarizer line overwrites earlier interval");
                self.endpoints[position].replace_summarizer_sample(sample);
            }
            None => {
                let endpoint = EndpointReport::with_summarizer_sample(key.clone(), sample);
                self.insert_endpoint(key, endpoint);
            }
        }
        Ok(())
    }

    /// Add an endpoint from an aggregate row. A repeated label replaces the earlier row.
    pub fn add_aggregate_endpoint(
        &mut self,
        label: &str,
        fields: AggregateFields,
    ) -> Result<(), ReportError> {
        self.expect_format(ReportFormat::Aggregate)?;
        if label.is_empty() {
            return Err(ReportError::EmptyLabel);
        }

        let key = sanitize_key(label);
        let endpoint = EndpointReport::with_aggregate(key.clone(), label, fields);
        match self.index.get(&key) {
            Some(&position) => self.endpoints[position] = endpoint,
            None => {
                self.insert_endpoint(key, endpoint);
            }
        }
        Ok(())
    }

    /// Set the run-level values of an aggregate report
    pub fn set_totals(&mut self, totals: AggregateFields) -> Result<(), ReportError> {
        self.expect_format(ReportFormat::Aggregate)?;
        self.totals = totals;
        Ok(())
    }

    /// Run-level values of an aggregate report (all zero for other formats)
    pub fn totals(&self) -> &AggregateFields {
        &self.totals
    }

    fn insert_endpoint(&mut self, key: String, endpoint: EndpointReport) -> usize {
        let position = self.endpoints.len();
        self.endpoints.push(endpoint);
        self.index.insert(key, position);
        position
    }

    /// Endpoints in first-seen order
    pub fn endpoints(&self) -> &[EndpointReport] {
        &self.endpoints
    }

    /// Endpoint by sanitized key
    pub fn endpoint(&self, key: &str) -> Option<&EndpointReport> {
        self.index.get(key).map(|&i| &self.endpoints[i])
    }

    /// Endpoint by sanitized key, as an error when absent
    pub fn require_endpoint(&self, key: &str) -> Result<&EndpointReport, ReportError> {
        self.endpoint(key)
            .ok_or_else(|| ReportError::NotFound(format!("{}/{}", self.source_file_name, key)))
    }

    /// Whether any endpoint was recorded
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// All sample durations across endpoints, sorted ascending
    pub fn flattened_durations(&self) -> Vec<u64> {
        let mut durations: Vec<u64> = self
            .endpoints
            .iter()
            .flat_map(|e| e.samples().iter().map(|s| s.duration))
            .collect();
        durations.sort_unstable();
        durations
    }

    /// Summed summarizer error percentages across endpoints
    pub fn summarizer_error_total(&self) -> f64 {
        self.endpoints
            .iter()
            .map(|e| e.aggregate_error_total())
            .sum()
    }

    /// Link this report to its counterpart from the previous build.
    ///
    /// Overwrites any earlier link. No reference is added to `previous`.
    pub fn link_previous(&mut self, previous: &Arc<RunReport>) {
        let matched = self
            .endpoints
            .iter()
            .filter(|e| previous.endpoint(e.key()).is_some())
            .count();
        tracing::debug!(
            report = %self.source_file_name,
            matched,
            total = self.endpoints.len(),
            "linked report to previous build"
        );
        self.previous = Some(Arc::downgrade(previous));
    }

    /// The previous build's report, if linked and still alive
    pub fn previous(&self) -> Option<Arc<RunReport>> {
        self.previous.as_ref().and_then(Weak::upgrade)
    }

    /// Run-level change against the previous build
    pub fn diff(&self) -> SummaryDelta {
        let previous = self.previous();
        compare_points(
            &self.stat_point(),
            previous.as_deref().map(|p| p.stat_point()).as_ref(),
        )
    }

    /// Change of one endpoint against the same key in the previous build.
    ///
    /// Zero when either the current endpoint or its counterpart is missing.
    pub fn endpoint_diff(&self, key: &str) -> SummaryDelta {
        let Some(current) = self.endpoint(key) else {
            return SummaryDelta::default();
        };
        let previous = self.previous();
        let counterpart = previous
            .as_deref()
            .and_then(|p| p.endpoint(key))
            .map(|e| e.stat_point());
        compare_points(&current.stat_point(), counterpart.as_ref())
    }

    /// The previous build's response codes for an endpoint, when they differ from now
    pub fn previous_http_code_if_changed(&self, key: &str) -> Option<String> {
        let current = self.endpoint(key)?;
        let previous = self.previous()?;
        let before = previous.endpoint(key)?.http_code();
        if before == current.http_code() {
            None
        } else {
            Some(before)
        }
    }

    /// Whether a previous-build counterpart exists for the endpoint
    pub fn has_previous_endpoint(&self, key: &str) -> bool {
        self.previous()
            .is_some_and(|p| self.endpoint(key).is_some() && p.endpoint(key).is_some())
    }
}

impl ReportStats for RunReport {
    fn size(&self) -> usize {
        match self.format {
            ReportFormat::Aggregate => self.totals.count as usize,
            _ => self.endpoints.iter().map(|e| e.size()).sum(),
        }
    }

    fn count_errors(&self) -> u64 {
        match self.format {
            ReportFormat::Standard => self.endpoints.iter().map(|e| e.count_errors()).sum(),
            ReportFormat::Summarizer => self.summarizer_error_total() as u64,
            ReportFormat::Aggregate => self.totals.count_errors(),
        }
    }

    fn error_percent(&self) -> f64 {
        match self.format {
            ReportFormat::Standard => percent_of(self.count_errors() as f64, self.size()),
            ReportFormat::Summarizer => {
                let size = self.size();
                if size == 0 {
                    0.0
                } else {
                    self.summarizer_error_total() / size as f64
                }
            }
            ReportFormat::Aggregate => self.totals.error_percent(),
        }
    }

    fn average(&self) -> u64 {
        self.summary().average
    }

    fn median(&self) -> u64 {
        match self.format {
            ReportFormat::Aggregate => self.totals.median,
            _ => checked_percentile(&self.flattened_durations(), MEDIAN_PERCENTILE),
        }
    }

    fn ninety_line(&self) -> u64 {
        match self.format {
            ReportFormat::Aggregate => self.totals.p90,
            _ => checked_percentile(&self.flattened_durations(), NINETY_LINE_PERCENTILE),
        }
    }

    fn percentile_line(&self, percentile: u32) -> Option<u64> {
        match self.format {
            ReportFormat::Aggregate => None,
            _ => Some(checked_percentile(&self.flattened_durations(), percentile)),
        }
    }

    fn min(&self) -> u64 {
        self.summary().min
    }

    fn max(&self) -> u64 {
        self.summary().max
    }

    /// Runs do not report a combined response code
    fn http_code(&self) -> String {
        String::new()
    }

    fn summary(&self) -> DurationSummary {
        match self.format {
            ReportFormat::Aggregate => DurationSummary {
                count: self.totals.count as usize,
                average: self.totals.average,
                median: self.totals.median,
                p90: self.totals.p90,
                min: self.totals.min,
                max: self.totals.max,
            },
            _ => compute_summary(&self.flattened_durations()),
        }
    }
}
