//! Parser contract and selection

use crate::aggregate::AggregateParser;
use crate::error::ParseError;
use crate::jtl_csv::JtlCsvParser;
use crate::jtl_xml::JtlXmlParser;
use crate::sink::DiagnosticSink;
use crate::summarizer::SummarizerParser;
use loadstat_report::RunReport;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// A format-specific reader producing one [`RunReport`] per file
pub trait ReportParser: Send + Sync {
    /// Which parser this is
    fn kind(&self) -> ParserKind;

    /// Build a report from file contents.
    ///
    /// Malformed lines go to `sink` and are skipped.
    fn parse_contents(&self, path: &Path, contents: &str, sink: &mut dyn DiagnosticSink)
    -> RunReport;

    /// Read and parse one file
    fn parse_file(
        &self,
        path: &Path,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<RunReport, ParseError> {
        let bytes = std::fs::read(path).map_err(|source| ParseError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        sink.note(format!(
            "Parsing {} report file {}",
            self.kind().display_name(),
            file_name(path)
        ));
        // Undecodable bytes become U+FFFD; the rest of the file still parses
        let contents = String::from_utf8_lossy(&bytes);
        if let Cow::Owned(_) = contents {
            tracing::warn!(file = %path.display(), "invalid UTF-8 replaced");
            sink.note(format!(
                "File {} is not valid UTF-8, undecodable bytes were replaced",
                file_name(path)
            ));
        }
        let report = self.parse_contents(path, &contents, sink);
        tracing::debug!(
            file = %path.display(),
            endpoints = report.endpoints().len(),
            "parsed report"
        );
        Ok(report)
    }

    /// Parse every file, skipping the unreadable ones
    fn parse(&self, files: &[PathBuf], sink: &mut dyn DiagnosticSink) -> Vec<RunReport> {
        let mut reports = Vec::with_capacity(files.len());
        for path in files {
            match self.parse_file(path, sink) {
                Ok(report) => reports.push(report),
                Err(e) => sink.error(e),
            }
        }
        reports
    }
}

/// Names of the supported parsers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParserKind {
    /// JMeter aggregate CSV
    Aggregate,
    /// JMeter summariser log
    Summarizer,
    /// JMeter CSV result trace
    JtlCsv,
    /// JMeter XML result trace
    JtlXml,
}

impl ParserKind {
    /// All parsers
    pub const ALL: [ParserKind; 4] = [
        ParserKind::Aggregate,
        ParserKind::Summarizer,
        ParserKind::JtlCsv,
        ParserKind::JtlXml,
    ];

    /// Configuration name
    pub fn as_str(self) -> &'static str {
        match self {
            ParserKind::Aggregate => "aggregate",
            ParserKind::Summarizer => "summarizer",
            ParserKind::JtlCsv => "jtl-csv",
            ParserKind::JtlXml => "jtl-xml",
        }
    }

    /// Name used in build-log lines
    pub fn display_name(self) -> &'static str {
        match self {
            ParserKind::Aggregate => "JMeterAggregate",
            ParserKind::Summarizer => "JMeterSummarizer",
            ParserKind::JtlCsv => "JMeter CSV",
            ParserKind::JtlXml => "JMeter",
        }
    }

    /// Glob used when no files are given
    pub fn default_pattern(self) -> &'static str {
        match self {
            ParserKind::Aggregate | ParserKind::Summarizer => "**/*.log",
            ParserKind::JtlCsv => "**/*.csv",
            ParserKind::JtlXml => "**/*.jtl",
        }
    }

    /// Instantiate the parser
    pub fn parser(self) -> Box<dyn ReportParser> {
        match self {
            ParserKind::Aggregate => Box::new(AggregateParser),
            ParserKind::Summarizer => Box::new(SummarizerParser),
            ParserKind::JtlCsv => Box::new(JtlCsvParser),
            ParserKind::JtlXml => Box::new(JtlXmlParser),
        }
    }
}

impl std::fmt::Display for ParserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ParserKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aggregate" | "jmeter-aggregate" => Ok(ParserKind::Aggregate),
            "summarizer" | "summariser" | "jmeter-summarizer" => Ok(ParserKind::Summarizer),
            "jtl-csv" | "csv" => Ok(ParserKind::JtlCsv),
            "jtl-xml" | "jtl" | "jmeter" => Ok(ParserKind::JtlXml),
            other => Err(ParseError::UnknownParser(other.to_string())),
        }
    }
}

/// Final path component as text, the name reports are keyed by
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
