//! Build Pipeline
//!
//! Ingests one build's result files, links them to the previous build and
//! classifies every run.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ParserConfig (loadstat.toml / CLI)
//!       │
//!       ▼
//! ┌─────────────┐
//! │   ingest    │  Resolve globs, parse files (parallel)
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │    link     │  RunSet::linked against the cached previous build
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  classify   │  Verdict per run, folded into the BuildOutcome
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable or JSON output
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`ingest`] - Pattern resolution and parallel parsing
//! - [`classification`] - Per-run verdicts
//! - [`formatting`] - Human-readable and JSON output

mod classification;
mod formatting;
mod ingest;

pub use classification::classify_set;
pub use formatting::{JsonOutput, format_human_output, format_json_output};
pub use ingest::{IngestError, Ingested, ingest, parse_files, resolve_files};

use crate::config::ParserConfig;
use loadstat_logic::{BuildOutcome, Thresholds, Verdict};
use loadstat_parse::ParserKind;
use loadstat_report::{BuildCache, RunSet};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a pipeline run needs
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Classification thresholds
    pub thresholds: Thresholds,
    /// Parsers to run, in order
    pub parsers: Vec<ParserConfig>,
}

/// Result of a pipeline run
#[derive(Debug, Default)]
pub struct PipelineOutput {
    /// One linked set per parser that produced reports
    pub builds: Vec<RunSet>,
    /// Build verdict, classifications and build log
    pub outcome: BuildOutcome,
}

/// Previous builds parsed during this run, keyed by parser and resolved files
pub type PreviousBuilds = BuildCache<(ParserKind, Vec<PathBuf>)>;

/// Run every configured parser and classify the results.
///
/// A parser that finds nothing fails the build and stops further parsers.
pub fn run_pipeline(config: &PipelineConfig) -> PipelineOutput {
    let mut output = PipelineOutput::default();
    let mut previous_builds = PreviousBuilds::new();

    for line in config.thresholds.banner_lines() {
        output.outcome.note(line);
    }

    for parser in &config.parsers {
        let patterns = parser.patterns();
        output.outcome.note(format!(
            "Performance: Recording {} reports '{}'",
            parser.kind.display_name(),
            patterns.join(", ")
        ));

        let ingested = match ingest(parser.kind, &patterns) {
            Ok(ingested) => ingested,
            Err(e) => {
                tracing::warn!("{}", e);
                let status = output.outcome.escalate(Verdict::Fail);
                output.outcome.note(format!(
                    "Performance: {}. Has the report generated?. Setting Build to {}",
                    e, status
                ));
                break;
            }
        };

        for line in ingested.diagnostics.lines() {
            output.outcome.note(line);
        }

        let set = match previous_build(parser, &mut previous_builds) {
            Some(previous) => RunSet::linked(ingested.reports, &previous),
            None => RunSet::new(ingested.reports),
        };

        classify_set(&set, &config.thresholds, &mut output.outcome);
        output.builds.push(set);
    }

    tracing::info!(verdict = %output.outcome.verdict(), "build classified");
    output
}

/// Parse (or reuse) the previous build for a parser, if one is configured
fn previous_build(parser: &ParserConfig, cache: &mut PreviousBuilds) -> Option<Arc<RunSet>> {
    if parser.previous.is_empty() {
        return None;
    }

    let files = match resolve_files(&parser.previous) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!("previous build not loaded: {}", e);
            return None;
        }
    };
    if files.is_empty() {
        tracing::warn!(
            patterns = %parser.previous.join(", "),
            "no previous build files found, diffs will be zero"
        );
        return None;
    }

    let kind = parser.kind;
    Some(cache.get_or_insert_with((kind, files.clone()), || {
        let ingested = parse_files(kind, &files);
        for error in ingested.diagnostics.errors() {
            tracing::warn!("previous build: {}", error);
        }
        RunSet::new(ingested.reports)
    }))
}
