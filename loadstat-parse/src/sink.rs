//! Diagnostic sinks
//!
//! Parsers report skipped files, skipped lines and progress notes to a caller-supplied
//! sink instead of failing. The build log collaborator reads them back as text.

use crate::error::ParseError;

/// One entry reported by a parser
#[derive(Debug)]
pub enum Diagnostic {
    /// Progress note
    Note(String),
    /// Skipped file or line
    Error(ParseError),
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::Note(note) => write!(f, "Performance: {}", note),
            Diagnostic::Error(error) => write!(f, "Performance: {}", error),
        }
    }
}

/// Receiver for parser diagnostics
pub trait DiagnosticSink {
    /// Record a progress note
    fn note(&mut self, message: String);

    /// Record a skipped file or line
    fn error(&mut self, error: ParseError);
}

/// Sink that keeps every diagnostic in order
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Vec<Diagnostic>,
}

impl CollectingSink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in report order
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Reported errors only
    pub fn errors(&self) -> impl Iterator<Item = &ParseError> {
        self.entries.iter().filter_map(|d| match d {
            Diagnostic::Error(e) => Some(e),
            Diagnostic::Note(_) => None,
        })
    }

    /// Entries rendered as build-log lines
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|d| d.to_string()).collect()
    }

    /// Append another sink's entries, keeping their order
    pub fn extend(&mut self, other: CollectingSink) {
        self.entries.extend(other.entries);
    }
}

impl DiagnosticSink for CollectingSink {
    fn note(&mut self, message: String) {
        self.entries.push(Diagnostic::Note(message));
    }

    fn error(&mut self, error: ParseError) {
        self.entries.push(Diagnostic::Error(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_collecting_sink_keeps_order() {
        let mut sink = CollectingSink::new();
        sink.note("Parsing a.log".to_string());
        sink.error(ParseError::MalformedLine {
            path: PathBuf::from("a.log"),
            line: 3,
            reason: "missing Avg:".to_string(),
        });

        assert_eq!(sink.entries().len(), 2);
        assert_eq!(sink.errors().count(), 1);
        assert_eq!(
            sink.lines(),
            vec![
                "Performance: Parsing a.log".to_string(),
                "Performance: a.log:3: missing Avg:".to_string(),
            ]
        );
    }

    #[test]
    fn test_extend_appends() {
        let mut first = CollectingSink::new();
        first.note("one".to_string());
        let mut second = CollectingSink::new();
        second.note("two".to_string());

        first.extend(second);
        assert_eq!(first.lines(), vec!["Performance: one", "Performance: two"]);
    }
}
