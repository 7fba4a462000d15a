//! Ingestion
//!
//! Resolves file patterns and parses the matching files in parallel. Each file gets
//! its own diagnostic sink; sinks are merged back in file order so the build log
//! reads the same however the work was scheduled.

use loadstat_parse::{CollectingSink, DiagnosticSink, ParserKind};
use loadstat_report::RunReport;
use rayon::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

/// Conditions that stop a build's ingestion
#[derive(Debug, Error)]
pub enum IngestError {
    /// Nothing parseable matched a parser's patterns
    #[error("no {parser} files matching '{pattern}' have been found")]
    NoReports {
        /// Parser that found nothing
        parser: ParserKind,
        /// Patterns it searched
        pattern: String,
    },

    /// A pattern that is not a valid glob
    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Offending pattern
        pattern: String,
        /// Glob error
        message: String,
    },
}

/// Reports parsed from one set of files
#[derive(Debug, Default)]
pub struct Ingested {
    /// One report per readable file, in file order
    pub reports: Vec<RunReport>,
    /// Notes and skipped files or lines
    pub diagnostics: CollectingSink,
}

/// Expand glob patterns to regular files, keeping first-match order without duplicates
pub fn resolve_files(patterns: &[String]) -> Result<Vec<PathBuf>, IngestError> {
    let mut files: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let matches = glob::glob(pattern).map_err(|e| IngestError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        for path in matches.filter_map(|entry| entry.ok()) {
            if path.is_file() && !files.contains(&path) {
                files.push(path);
            }
        }
    }
    Ok(files)
}

/// Parse files with one parser, in parallel
pub fn parse_files(kind: ParserKind, files: &[PathBuf]) -> Ingested {
    let parser = kind.parser();
    let parser = parser.as_ref();

    let results: Vec<_> = files
        .par_iter()
        .map(|path| {
            let mut sink = CollectingSink::new();
            let report = parser.parse_file(path, &mut sink);
            (report, sink)
        })
        .collect();

    let mut ingested = Ingested::default();
    for (report, sink) in results {
        ingested.diagnostics.extend(sink);
        match report {
            Ok(report) => ingested.reports.push(report),
            Err(e) => ingested.diagnostics.error(e),
        }
    }
    tracing::debug!(
        parser = %kind,
        files = files.len(),
        reports = ingested.reports.len(),
        "ingested files"
    );
    ingested
}

/// Resolve and parse, failing when nothing parseable was found
pub fn ingest(kind: ParserKind, patterns: &[String]) -> Result<Ingested, IngestError> {
    let no_reports = || IngestError::NoReports {
        parser: kind,
        pattern: patterns.join(", "),
    };

    let files = resolve_files(patterns)?;
    if files.is_empty() {
        return Err(no_reports());
    }

    let ingested = parse_files(kind, &files);
    if ingested.reports.is_empty() {
        return Err(no_reports());
    }
    Ok(ingested)
}
