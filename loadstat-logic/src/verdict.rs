//! Verdicts and build-wide folding

use crate::classify::Classification;
use serde::{Deserialize, Serialize};

/// Result of classifying one run, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Within every threshold
    #[default]
    Success,
    /// Error rate above the unstable threshold
    Unstable,
    /// Error rate above the fail threshold, or 90th percentile above the SLA
    Fail,
}

impl Verdict {
    /// Whether this verdict is worse than `other`
    pub fn is_worse_than(self, other: Verdict) -> bool {
        self > other
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Success => write!(f, "SUCCESS"),
            Verdict::Unstable => write!(f, "UNSTABLE"),
            Verdict::Fail => write!(f, "FAILURE"),
        }
    }
}

/// Worst verdict seen across a build, plus the log it produced.
///
/// The verdict only ever escalates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildOutcome {
    verdict: Verdict,
    classifications: Vec<Classification>,
    #[serde(skip)]
    log: Vec<String>,
}

impl BuildOutcome {
    /// Start at `Success`
    pub fn new() -> Self {
        Self::default()
    }

    /// Current build verdict
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Raise the build verdict to at least `verdict`
    pub fn escalate(&mut self, verdict: Verdict) -> Verdict {
        if verdict.is_worse_than(self.verdict) {
            tracing::debug!(from = %self.verdict, to = %verdict, "build verdict escalated");
            self.verdict = verdict;
        }
        self.verdict
    }

    /// Fold one classification in and log its lines. Returns the build verdict after it.
    pub fn record(&mut self, classification: Classification) -> Verdict {
        let status = self.escalate(classification.verdict);
        self.log.extend(classification.detail_lines());
        self.log.push(classification.summary_line(status));
        self.classifications.push(classification);
        status
    }

    /// Append a free-form log line
    pub fn note(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    /// Classifications in the order they were recorded
    pub fn classifications(&self) -> &[Classification] {
        &self.classifications
    }

    /// Build-log lines in the order they were produced
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Whether the build failed
    pub fn is_failure(&self) -> bool {
        self.verdict == Verdict::Fail
    }
}

impl Extend<Classification> for BuildOutcome {
    fn extend<I: IntoIterator<Item = Classification>>(&mut self, iter: I) {
        for classification in iter {
            self.record(classification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Verdict::Success < Verdict::Unstable);
        assert!(Verdict::Unstable < Verdict::Fail);
        assert!(Verdict::Fail.is_worse_than(Verdict::Success));
        assert!(!Verdict::Unstable.is_worse_than(Verdict::Unstable));
    }

    #[test]
    fn test_escalate_only() {
        let mut outcome = BuildOutcome::new();
        let sequence = [
            Verdict::Success,
            Verdict::Unstable,
            Verdict::Success,
            Verdict::Fail,
            Verdict::Unstable,
        ];
        let seen: Vec<_> = sequence.iter().map(|v| outcome.escalate(*v)).collect();

        assert_eq!(
            seen,
            vec![
                Verdict::Success,
                Verdict::Unstable,
                Verdict::Unstable,
                Verdict::Fail,
                Verdict::Fail
            ]
        );
        assert!(outcome.is_failure());
    }

    #[test]
    fn test_escalation_never_improves() {
        let mut outcome = BuildOutcome::new();
        assert_eq!(outcome.escalate(Verdict::Unstable), Verdict::Unstable);
        assert_eq!(outcome.escalate(Verdict::Success), Verdict::Unstable);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Verdict::Success.to_string(), "SUCCESS");
        assert_eq!(Verdict::Unstable.to_string(), "UNSTABLE");
        assert_eq!(Verdict::Fail.to_string(), "FAILURE");
    }
}
