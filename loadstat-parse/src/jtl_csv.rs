//! JMeter CSV result trace parser
//!
//! One record per request. Columns are located by the header row; files written
//! without a header are read in JMeter's default column order.

use crate::error::ParseError;
use crate::parser::{ParserKind, ReportParser, file_name};
use crate::sink::DiagnosticSink;
use chrono::{DateTime, NaiveDateTime, Utc};
use loadstat_report::{ReportFormat, RunReport, Sample};
use std::path::Path;

/// JMeter's default `jmeter.save.saveservice` column order
const DEFAULT_COLUMNS: [&str; 8] = [
    "timeStamp",
    "elapsed",
    "label",
    "responseCode",
    "responseMessage",
    "threadName",
    "dataType",
    "success",
];

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// Parser for CSV `.jtl` traces
#[derive(Debug, Default, Clone, Copy)]
pub struct JtlCsvParser;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ColumnMap {
    timestamp: usize,
    elapsed: usize,
    label: usize,
    response_code: Option<usize>,
    success: Option<usize>,
}

impl ColumnMap {
    fn from_header(columns: &[String]) -> Option<Self> {
        let find = |name: &str| columns.iter().position(|c| c.trim() == name);
        Some(Self {
            timestamp: find("timeStamp")?,
            elapsed: find("elapsed")?,
            label: find("label")?,
            response_code: find("responseCode"),
            success: find("success"),
        })
    }

    fn jmeter_default() -> Self {
        let find = |name: &str| DEFAULT_COLUMNS.iter().position(|c| *c == name);
        Self {
            timestamp: 0,
            elapsed: 1,
            label: 2,
            response_code: find("responseCode"),
            success: find("success"),
        }
    }
}

impl ReportParser for JtlCsvParser {
    fn kind(&self) -> ParserKind {
        ParserKind::JtlCsv
    }

    fn parse_contents(
        &self,
        path: &Path,
        contents: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> RunReport {
        let mut report = RunReport::new(file_name(path), ReportFormat::Standard);
        let mut columns: Option<ColumnMap> = None;

        for (number, line) in contents.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_record(line);

            let map = match columns {
                Some(map) => map,
                None => {
                    let map = ColumnMap::from_header(&fields);
                    let is_header = map.is_some();
                    let map = map.unwrap_or_else(ColumnMap::jmeter_default);
                    columns = Some(map);
                    if is_header {
                        continue;
                    }
                    map
                }
            };

            let sample = parse_record(&fields, &map).and_then(|s| {
                report.add_sample(s).map_err(|e| e.to_string())
            });
            if let Err(reason) = sample {
                sink.error(ParseError::malformed(path, number + 1, reason));
            }
        }

        report
    }
}

fn parse_record(fields: &[String], map: &ColumnMap) -> Result<Sample, String> {
    let field = |index: usize, name: &str| -> Result<&str, String> {
        fields
            .get(index)
            .map(|f| f.as_str())
            .ok_or_else(|| format!("missing {} column", name))
    };

    let elapsed_text = field(map.elapsed, "elapsed")?;
    let duration = elapsed_text
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid elapsed: {:?}", elapsed_text))?;
    let timestamp = parse_timestamp(field(map.timestamp, "timeStamp")?)?;
    let label = field(map.label, "label")?;

    let mut sample = Sample::new(label, duration, timestamp);
    if let Some(index) = map.success {
        let text = field(index, "success")?;
        sample.successful = text.trim().eq_ignore_ascii_case("true");
    }
    if let Some(code) = map.response_code.and_then(|i| fields.get(i)) {
        sample.http_code = code.trim().to_string();
    }
    Ok(sample)
}

/// Epoch milliseconds, or JMeter's `yyyy/MM/dd HH:mm:ss.SSS` (read as UTC)
pub(crate) fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, String> {
    let text = text.trim();
    if let Ok(millis) = text.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| format!("timestamp out of range: {}", millis));
    }
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| format!("invalid timeStamp: {:?}", text))
}

/// Split one CSV record, honoring double-quoted fields
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
