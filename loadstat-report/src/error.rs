//! Report model errors

use crate::run::ReportFormat;
use thiserror::Error;

/// Errors raised while building or querying reports
#[derive(Debug, Error)]
pub enum ReportError {
    /// Lookup of a report or endpoint that does not exist
    #[error("Report not found: {0}")]
    NotFound(String),

    /// Sample or row without a label
    #[error("Sample has an empty label")]
    EmptyLabel,

    /// Data added to a report of a different input format
    #[error("Expected a {expected} report, got {actual}")]
    FormatMismatch {
        /// Format the operation requires
        expected: ReportFormat,
        /// Format of the report
        actual: ReportFormat,
    },
}
