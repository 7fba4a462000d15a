//! Parse errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported while reading result files.
///
/// None of these abort a parse: the file or line is skipped and the error is
/// handed to the [`DiagnosticSink`](crate::DiagnosticSink).
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file could not be read
    #[error("Cannot read {}: {source}", path.display())]
    FileUnreadable {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A line that does not match the format
    #[error("{}:{line}: {reason}", path.display())]
    MalformedLine {
        /// File containing the line
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },

    /// Unknown parser name
    #[error("Unknown parser: {0} (expected aggregate, summarizer, jtl-csv or jtl-xml)")]
    UnknownParser(String),
}

impl ParseError {
    pub(crate) fn malformed(path: &std::path::Path, line: usize, reason: impl Into<String>) -> Self {
        ParseError::MalformedLine {
            path: path.to_path_buf(),
            line,
            reason: reason.into(),
        }
    }
}
