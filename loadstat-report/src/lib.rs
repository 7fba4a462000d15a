#![warn(missing_docs)]
//! Loadstat Report - Canonical Report Model
//!
//! Every supported input format normalizes into the same tree:
//!
//! ```text
//! RunSet ─▶ RunReport (one per file) ─▶ EndpointReport (one per key) ─▶ Sample
//! ```
//!
//! - Statistics for every level go through [`ReportStats`]
//! - Runs link to the previous build's run for diffing
//! - [`BuildCache`] memoizes parsed builds by identity
//! - [`BuildSnapshot`] serializes a build to JSON

mod endpoint;
mod error;
mod json;
mod key;
mod run;
mod sample;
mod set;
mod stats;

pub use endpoint::{AggregateFields, EndpointBody, EndpointReport, SHORT_URI_LIMIT};
pub use error::ReportError;
pub use json::{BuildSnapshot, EndpointSnapshot, ReportSchema, RunSnapshot, generate_json_report};
pub use key::{normalize_report_name, sanitize_key};
pub use run::{ReportFormat, RunReport};
pub use sample::{IntervalCounts, Sample};
pub use set::{BuildCache, RunSet};
pub use stats::ReportStats;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Human,
    /// JSON snapshot
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
