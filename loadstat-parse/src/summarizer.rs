//! JMeter summariser log parser
//!
//! Reads the periodic lines JMeter's `Summariser` writes to its log:
//!
//! ```text
//! 2012/02/06 12:35:00 INFO  - jmeter.reporters.Summariser: summary =   120 in  62.3s =    1.9/s Avg:   254 Min:   102 Max:  1410 Err:     3 (2.50%)
//! ```
//!
//! Delta lines (`summary +`) are skipped. Each key keeps only its latest line.

use crate::error::ParseError;
use crate::parser::{ParserKind, ReportParser, file_name};
use crate::sink::DiagnosticSink;
use chrono::{DateTime, Utc};
use loadstat_report::{IntervalCounts, ReportFormat, RunReport, Sample};
use std::path::Path;

/// Marker preceding the endpoint key
pub const SUMMARISER_MARKER: &str = "jmeter.reporters.Summariser:";

/// Summariser lines carry no per-line timestamp; every sample gets this instant
pub const PLACEHOLDER_TIMESTAMP_MS: i64 = 1_296_876_799_179;

/// Parser for summariser logs
#[derive(Debug, Default, Clone, Copy)]
pub struct SummarizerParser;

/// Timestamp stamped on every summariser sample
pub fn placeholder_timestamp() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(PLACEHOLDER_TIMESTAMP_MS).unwrap_or_default()
}

impl ReportParser for SummarizerParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Summarizer
    }

    fn parse_contents(
        &self,
        path: &Path,
        contents: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> RunReport {
        let mut report = RunReport::new(file_name(path), ReportFormat::Summarizer);
        let timestamp = placeholder_timestamp();

        for (number, raw) in contents.lines().enumerate() {
            let line = raw.replace('=', " ");
            if line.contains('+') {
                continue;
            }
            let Some((_, rest)) = line.split_once(SUMMARISER_MARKER) else {
                continue;
            };

            match parse_summary(rest, timestamp) {
                Ok(sample) => {
                    if let Err(e) = report.put_summarizer_sample(sample) {
                        sink.error(ParseError::malformed(path, number + 1, e.to_string()));
                    }
                }
                Err(reason) => sink.error(ParseError::malformed(path, number + 1, reason)),
            }
        }

        report
    }
}

fn value_after<'a>(tokens: &[&'a str], marker: &str) -> Result<&'a str, String> {
    tokens
        .iter()
        .position(|t| *t == marker)
        .and_then(|i| tokens.get(i + 1).copied())
        .ok_or_else(|| format!("missing value after {}", marker))
}

fn number<T: std::str::FromStr>(token: &str, name: &str) -> Result<T, String> {
    token
        .parse::<T>()
        .map_err(|_| format!("invalid {}: {:?}", name, token))
}

fn parse_summary(rest: &str, timestamp: DateTime<Utc>) -> Result<Sample, String> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let key = *tokens.first().ok_or("missing endpoint key")?;
    let count = number::<u64>(tokens.get(1).copied().unwrap_or_default(), "sample count")?;

    let average = number::<u64>(value_after(&tokens, "Avg:")?, "Avg")?;
    let min = number::<u64>(value_after(&tokens, "Min:")?, "Min")?;
    let max = number::<u64>(value_after(&tokens, "Max:")?, "Max")?;

    let err_position = tokens
        .iter()
        .position(|t| *t == "Err:")
        .ok_or("missing Err:")?;
    let percent_token = tokens
        .get(err_position + 2)
        .ok_or("missing error percentage")?;
    let percent = number::<f64>(
        percent_token.trim_matches(|c| matches!(c, '(' | ')' | '%')),
        "error percentage",
    )?;

    let mut sample = Sample::new(key, average, timestamp);
    sample.aggregate_error_value = Some(percent);
    sample.interval = Some(IntervalCounts {
        samples: count,
        min,
        max,
    });
    Ok(sample)
}
