#![warn(missing_docs)]
//! Loadstat Logic - Threshold Classification
//!
//! Turns a run's error rate and 90th percentile into a [`Verdict`] and folds
//! verdicts across a build into a [`BuildOutcome`] that only ever gets worse.

mod classify;
mod thresholds;
mod verdict;

pub use classify::{
    Classification, THRESHOLD_TOLERANCE, VerdictReason, classify, classify_run,
};
pub use thresholds::{SLA_DISABLED, Thresholds};
pub use verdict::{BuildOutcome, Verdict};
