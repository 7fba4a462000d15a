//! JSON Output

use crate::endpoint::EndpointReport;
use crate::run::{ReportFormat, RunReport};
use crate::set::RunSet;
use crate::stats::ReportStats;
use loadstat_stats::{DurationSummary, SummaryDelta};
use serde::{Deserialize, Serialize};

/// Schema information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSchema {
    /// Schema identifier
    pub schema: String,
    /// Schema version
    pub version: String,
}

impl Default for ReportSchema {
    fn default() -> Self {
        Self {
            schema: "loadstat-report".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Serializable view of one endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSnapshot {
    /// Sanitized key
    pub key: String,
    /// Display URI, shortened
    pub uri: String,
    /// Duration statistics
    pub summary: DurationSummary,
    /// Failed samples
    pub errors: u64,
    /// Error rate
    pub error_percent: f64,
    /// Distinct response codes
    #[serde(skip_serializing_if = "String::is_empty")]
    pub http_code: String,
    /// Response codes of the previous build, when they changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_http_code: Option<String>,
    /// Change against the previous build, absent when there is no counterpart
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<SummaryDelta>,
}

/// Serializable view of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSnapshot {
    /// Source file name
    pub file: String,
    /// Input format
    pub format: ReportFormat,
    /// Duration statistics across the run
    pub summary: DurationSummary,
    /// Failed samples
    pub errors: u64,
    /// Error rate
    pub error_percent: f64,
    /// Change against the previous build, absent when unlinked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<SummaryDelta>,
    /// Endpoints in first-seen order
    pub endpoints: Vec<EndpointSnapshot>,
}

impl RunSnapshot {
    /// Capture a run and its endpoints
    pub fn capture(report: &RunReport) -> Self {
        let linked = report.previous().is_some();
        Self {
            file: report.source_file_name().to_string(),
            format: report.format(),
            summary: report.summary(),
            errors: report.count_errors(),
            error_percent: report.error_percent(),
            diff: linked.then(|| report.diff()),
            endpoints: report
                .endpoints()
                .iter()
                .map(|e| EndpointSnapshot::capture(report, e))
                .collect(),
        }
    }
}

impl EndpointSnapshot {
    fn capture(run: &RunReport, endpoint: &EndpointReport) -> Self {
        let key = endpoint.key();
        Self {
            key: key.to_string(),
            uri: endpoint.short_uri().to_string(),
            summary: endpoint.summary(),
            errors: endpoint.count_errors(),
            error_percent: endpoint.error_percent(),
            http_code: endpoint.http_code(),
            previous_http_code: run.previous_http_code_if_changed(key),
            diff: run
                .has_previous_endpoint(key)
                .then(|| run.endpoint_diff(key)),
        }
    }
}

/// Full JSON document for a build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSnapshot {
    /// Schema information
    #[serde(flatten)]
    pub schema: ReportSchema,
    /// One entry per report
    pub runs: Vec<RunSnapshot>,
}

impl BuildSnapshot {
    /// Capture every report of a build
    pub fn capture(set: &RunSet) -> Self {
        Self {
            schema: ReportSchema::default(),
            runs: set.reports().iter().map(|r| RunSnapshot::capture(r)).collect(),
        }
    }
}

/// Generate a prettified JSON report.
pub fn generate_json_report(snapshot: &BuildSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}
