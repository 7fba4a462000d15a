//! Run classification
//!
//! Checks run in a fixed order and the first that trips decides:
//!
//! 1. error rate above the fail threshold → `Fail`
//! 2. error rate above the unstable threshold → `Unstable`
//! 3. 90th percentile above the SLA → `Fail`
//! 4. otherwise `Success`

use crate::thresholds::Thresholds;
use crate::verdict::Verdict;
use loadstat_report::{ReportStats, RunReport};
use serde::{Deserialize, Serialize};

/// Absorbs floating point noise when comparing error rates to whole-number thresholds
pub const THRESHOLD_TOLERANCE: f64 = 1e-8;

/// Which check decided a verdict
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum VerdictReason {
    /// Error rate exceeded the fail threshold
    ErrorsAboveFail {
        /// Configured threshold
        threshold: i32,
    },
    /// Error rate exceeded the unstable threshold
    ErrorsAboveUnstable {
        /// Configured threshold
        threshold: i32,
    },
    /// 90th percentile exceeded the SLA
    SlaExceeded {
        /// Configured SLA (ms)
        sla_millis: u64,
    },
    /// Nothing tripped
    WithinThresholds,
}

/// Verdict for one run with the values it was based on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Report file name
    pub report: String,
    /// Error rate the checks saw
    pub error_percent: f64,
    /// 90th percentile the SLA check saw (ms)
    pub ninety_line: u64,
    /// Outcome
    pub verdict: Verdict,
    /// Deciding check
    pub reason: VerdictReason,
}

impl Classification {
    /// Lines explaining the verdict, written before the summary line
    pub fn detail_lines(&self) -> Vec<String> {
        match self.reason {
            VerdictReason::SlaExceeded { sla_millis } => vec![format!(
                "Failed to fall under 90th percentile threshold. Value is: {} and the threshhold is {}",
                self.ninety_line, sla_millis
            )],
            _ => Vec::new(),
        }
    }

    /// Per-file summary line, given the build verdict after this report
    pub fn summary_line(&self, build_status: Verdict) -> String {
        format!(
            "Performance: File {} reported {:?}% of errors [{}]. Build status is: {}",
            self.report, self.error_percent, self.verdict, build_status
        )
    }
}

/// Classify any report level against the thresholds
pub fn classify<R: ReportStats + ?Sized>(
    name: &str,
    report: &R,
    thresholds: &Thresholds,
) -> Classification {
    let error_percent = report.error_percent();
    let ninety_line = report.ninety_line();

    let (verdict, reason) = if thresholds
        .fail()
        .is_some_and(|fail| error_percent - fail > THRESHOLD_TOLERANCE)
    {
        (
            Verdict::Fail,
            VerdictReason::ErrorsAboveFail {
                threshold: thresholds.fail_threshold,
            },
        )
    } else if thresholds
        .unstable()
        .is_some_and(|unstable| error_percent - unstable > THRESHOLD_TOLERANCE)
    {
        (
            Verdict::Unstable,
            VerdictReason::ErrorsAboveUnstable {
                threshold: thresholds.unstable_threshold,
            },
        )
    } else if ninety_line > thresholds.sla_millis {
        (
            Verdict::Fail,
            VerdictReason::SlaExceeded {
                sla_millis: thresholds.sla_millis,
            },
        )
    } else {
        (Verdict::Success, VerdictReason::WithinThresholds)
    };

    tracing::debug!(
        report = name,
        error_percent,
        ninety_line,
        verdict = %verdict,
        "classified report"
    );

    Classification {
        report: name.to_string(),
        error_percent,
        ninety_line,
        verdict,
        reason,
    }
}

/// Classify a run under its source file name
pub fn classify_run(report: &RunReport, thresholds: &Thresholds) -> Classification {
    classify(report.source_file_name(), report, thresholds)
}
