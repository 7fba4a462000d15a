#![warn(missing_docs)]
//! # Loadstat
//!
//! Load test result analysis: ingest result files, compute statistics, diff against
//! the previous build and classify the build against thresholds.
//!
//! - **Multi-Format Parsing**: JMeter aggregate CSV, summariser logs, CSV and XML traces
//! - **One Report Model**: run → endpoint → sample, whatever the input format
//! - **Nearest-Rank Percentiles**: median and 90% line over flattened samples
//! - **Build Diffs**: every run and endpoint compared with its previous-build counterpart
//! - **Threshold Verdicts**: success / unstable / failure, folded across the build
//!
//! ## Quick Start
//!
//! ```ignore
//! use loadstat::prelude::*;
//!
//! let mut sink = CollectingSink::new();
//! let reports = ParserKind::JtlXml.parser().parse(&files, &mut sink);
//! let build = RunSet::new(reports);
//!
//! let thresholds = Thresholds { fail_threshold: 20, unstable_threshold: 10, sla_millis: 500 };
//! let mut outcome = BuildOutcome::new();
//! outcome.extend(build.reports().iter().map(|r| classify_run(r, &thresholds)));
//! ```

// Re-export the report model
pub use loadstat_report::{
    AggregateFields, BuildCache, BuildSnapshot, EndpointBody, EndpointReport, EndpointSnapshot,
    IntervalCounts, OutputFormat, ReportError, ReportFormat, ReportStats, RunReport, RunSet,
    RunSnapshot, Sample, generate_json_report, normalize_report_name, sanitize_key,
};

// Re-export parsers
pub use loadstat_parse::{
    AggregateParser, CollectingSink, Diagnostic, DiagnosticSink, JtlCsvParser, JtlXmlParser,
    ParseError, ParserKind, ReportParser, SummarizerParser,
};

// Re-export classification
pub use loadstat_logic::{
    BuildOutcome, Classification, Thresholds, Verdict, VerdictReason, classify, classify_run,
};

// Re-export stats
pub use loadstat_stats::{
    DurationSummary, PercentileError, StatPoint, SummaryDelta, compute_percentile,
    compute_summary, nearest_rank_index,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BuildOutcome, CollectingSink, ParserKind, ReportParser, ReportStats, RunReport, RunSet,
        Thresholds, Verdict, classify_run,
    };
}

/// Run the Loadstat CLI.
///
/// ```ignore
/// fn main() {
///     loadstat::run().unwrap();
/// }
/// ```
pub use loadstat_cli::run;
