#![warn(missing_docs)]
//! Loadstat Parse - Result File Readers
//!
//! Turns load-test result files into [`RunReport`](loadstat_report::RunReport)s.
//! One report per file; unreadable files and malformed lines are skipped and
//! reported to a [`DiagnosticSink`] so that one bad file never hides the rest.
//!
//! | Parser               | Input                          | Report format |
//! |----------------------|--------------------------------|---------------|
//! | [`AggregateParser`]  | JMeter aggregate CSV           | Aggregate     |
//! | [`SummarizerParser`] | JMeter summariser log lines    | Summarizer    |
//! | [`JtlCsvParser`]     | JMeter CSV result trace        | Standard      |
//! | [`JtlXmlParser`]     | JMeter XML result trace        | Standard      |

mod aggregate;
mod error;
mod jtl_csv;
mod jtl_xml;
mod parser;
mod sink;
mod summarizer;

pub use aggregate::AggregateParser;
pub use error::ParseError;
pub use jtl_csv::JtlCsvParser;
pub use jtl_xml::JtlXmlParser;
pub use parser::{ParserKind, ReportParser, file_name};
pub use sink::{CollectingSink, Diagnostic, DiagnosticSink};
pub use summarizer::{
    PLACEHOLDER_TIMESTAMP_MS, SUMMARISER_MARKER, SummarizerParser, placeholder_timestamp,
};
