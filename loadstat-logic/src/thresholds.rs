//! Threshold configuration

use crate::verdict::Verdict;
use serde::{Deserialize, Serialize};

/// SLA value that never trips the 90th percentile check
pub const SLA_DISABLED: u64 = u64::MAX;

/// Limits a run is classified against.
///
/// An error threshold outside `0..=100` (conventionally `-1`) disables that check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Error percentage above which a run fails
    pub fail_threshold: i32,
    /// Error percentage above which a run is unstable
    pub unstable_threshold: i32,
    /// 90th percentile limit in milliseconds
    pub sla_millis: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fail_threshold: -1,
            unstable_threshold: -1,
            sla_millis: SLA_DISABLED,
        }
    }
}

fn in_range(threshold: i32) -> Option<f64> {
    (0..=100)
        .contains(&threshold)
        .then_some(f64::from(threshold))
}

impl Thresholds {
    /// Fail threshold, if enabled
    pub fn fail(&self) -> Option<f64> {
        in_range(self.fail_threshold)
    }

    /// Unstable threshold, if enabled
    pub fn unstable(&self) -> Option<f64> {
        in_range(self.unstable_threshold)
    }

    /// Lines announcing the active thresholds, written before any report is classified
    pub fn banner_lines(&self) -> Vec<String> {
        let describe = |threshold: Option<f64>, raw: i32, verdict: Verdict| match threshold {
            Some(_) => format!(
                "Performance: Percentage of errors greater or equal than {}% sets the build as {}",
                raw,
                verdict.to_string().to_lowercase()
            ),
            None => format!(
                "Performance: No threshold configured for making the test {}",
                verdict.to_string().to_lowercase()
            ),
        };

        vec![
            describe(self.unstable(), self.unstable_threshold, Verdict::Unstable),
            describe(self.fail(), self.fail_threshold, Verdict::Fail),
        ]
    }
}
