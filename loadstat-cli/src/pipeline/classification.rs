//! Classification
//!
//! Classifies every run of a build in input order and folds the verdicts.

use loadstat_logic::{BuildOutcome, Thresholds, classify_run};
use loadstat_report::RunSet;

/// Record a verdict for each run of `set`
pub fn classify_set(set: &RunSet, thresholds: &Thresholds, outcome: &mut BuildOutcome) {
    outcome.extend(
        set.reports()
            .iter()
            .map(|report| classify_run(report, thresholds)),
    );
}
