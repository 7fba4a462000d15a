//! JMeter aggregate report parser
//!
//! ```text
//! sampler_label,count,average,median,90%_line,min,max,error%
//! Home,10,200,180,300,50,400,0.1
//! TOTAL,25,210,190,320,40,410,0.04
//! ```
//!
//! The error column is a fraction. `TOTAL` sets the run-level values.

use crate::error::ParseError;
use crate::parser::{ParserKind, ReportParser, file_name};
use crate::sink::DiagnosticSink;
use loadstat_report::{AggregateFields, ReportFormat, RunReport};
use std::path::Path;

const HEADER_PREFIX: &str = "sampler_label";
const TOTAL_PREFIX: &str = "TOTAL";
const NUMERIC_COLUMNS: usize = 7;

/// Parser for aggregate CSV files
#[derive(Debug, Default, Clone, Copy)]
pub struct AggregateParser;

impl ReportParser for AggregateParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Aggregate
    }

    fn parse_contents(
        &self,
        path: &Path,
        contents: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> RunReport {
        let mut report = RunReport::new(file_name(path), ReportFormat::Aggregate);

        for (number, line) in contents.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with(HEADER_PREFIX) {
                continue;
            }

            let (label, fields) = match parse_row(line) {
                Ok(row) => row,
                Err(reason) => {
                    sink.error(ParseError::malformed(path, number + 1, reason));
                    continue;
                }
            };

            let result = if label.starts_with(TOTAL_PREFIX) {
                report.set_totals(fields)
            } else {
                report.add_aggregate_endpoint(label, fields)
            };
            if let Err(e) = result {
                sink.error(ParseError::malformed(path, number + 1, e.to_string()));
            }
        }

        report
    }
}

/// Split a row into its label and values. The label may itself contain commas.
fn parse_row(line: &str) -> Result<(&str, AggregateFields), String> {
    let mut columns: Vec<&str> = line.rsplitn(NUMERIC_COLUMNS + 1, ',').collect();
    if columns.len() != NUMERIC_COLUMNS + 1 {
        return Err(format!(
            "expected {} columns, found {}",
            NUMERIC_COLUMNS + 1,
            columns.len()
        ));
    }
    columns.reverse();

    let integer = |index: usize, name: &str| -> Result<u64, String> {
        columns[index]
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("invalid {}: {:?}", name, columns[index]))
    };

    let error_fraction = columns[7]
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("invalid error fraction: {:?}", columns[7]))?;

    let fields = AggregateFields {
        count: integer(1, "count")?,
        average: integer(2, "average")?,
        median: integer(3, "median")?,
        p90: integer(4, "90% line")?,
        min: integer(5, "min")?,
        max: integer(6, "max")?,
        error_fraction,
    };
    Ok((columns[0], fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;
    use loadstat_report::ReportStats;

    const AGGREGATE: &str = "\
sampler_label,count,average,median,90%_line,min,max,error%
Home,10,200,180,300,50,400,0.1
http://host/app/login,15,220,200,330,40,410,0.0
TOTAL,25,210,190,320,40,410,0.04
";

    fn parse(contents: &str) -> (RunReport, CollectingSink) {
        let mut sink = CollectingSink::new();
        let report = AggregateParser.parse_contents(Path::new("agg.log"), contents, &mut sink);
        (report, sink)
    }

    #[test]
    fn test_rows_and_total() {
        let (report, sink) = parse(AGGREGATE);
        assert_eq!(sink.errors().count(), 0);

        assert_eq!(report.endpoints().len(), 2);
        assert_eq!(report.size(), 25);
        assert_eq!(report.average(), 210);
        assert_eq!(report.median(), 190);
        assert_eq!(report.ninety_line(), 320);
        assert_eq!(report.min(), 40);
        assert_eq!(report.max(), 410);
        assert!((report.error_percent() - 4.0).abs() < 1e-9);
        assert_eq!(report.percentile_line(50), None);

        let home = report.endpoint("Home").unwrap();
        assert_eq!(home.size(), 10);
        assert!((home.error_percent() - 10.0).abs() < 1e-9);

        assert!(report.endpoint("__host_app_login").is_some());
    }

    #[test]
    fn test_missing_total_leaves_size_zero() {
        let (report, _) = parse("Home,10,200,180,300,50,400,0.1\n");
        assert_eq!(report.size(), 0);
        assert_eq!(report.endpoints().len(), 1);
    }

    #[test]
    fn test_label_with_comma() {
        let (report, _) = parse("search?a=1,b=2,3,100,100,100,100,100,0.0\n");
        let endpoint = report.endpoint("search?a=1,b=2").unwrap();
        assert_eq!(endpoint.size(), 3);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let (report, sink) = parse("Home,ten,200,180,300,50,400,0.1\nshort,1,2\n\nOk,1,1,1,1,1,1,0\n");
        assert_eq!(report.endpoints().len(), 1);

        let errors: Vec<_> = sink.errors().collect();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ParseError::MalformedLine { line: 1, .. }));
        assert!(matches!(errors[1], ParseError::MalformedLine { line: 2, .. }));
    }
}
