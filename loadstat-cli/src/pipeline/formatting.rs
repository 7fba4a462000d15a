//! Output Formatting
//!
//! Human-readable and JSON output for a classified build.
//!
//! The human output prints the build log, then one block per run:
//! - Run statistics with diffs against the previous build
//! - An endpoint table
//! - The final build status

use super::PipelineOutput;
use loadstat_logic::{Classification, Verdict};
use loadstat_report::{BuildSnapshot, ReportSchema, ReportStats, RunReport, RunSnapshot};
use serde::Serialize;

const RULE_WIDTH: usize = 60;

fn signed(value: i64) -> String {
    if value > 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

fn signed_percent(value: f64) -> String {
    if value > 0.0 {
        format!("+{:.2}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn verdict_for<'a>(output: &'a PipelineOutput, report: &RunReport) -> Option<&'a Classification> {
    output
        .outcome
        .classifications()
        .iter()
        .find(|c| c.report == report.source_file_name())
}

fn format_run(output: &mut String, report: &RunReport, verdict: Option<Verdict>) {
    let status = verdict.map(|v| format!("  [{}]", v)).unwrap_or_default();
    output.push_str(&format!("{}{}\n", report.source_file_name(), status));
    output.push_str(&"-".repeat(RULE_WIDTH));
    output.push('\n');

    output.push_str(&format!(
        "  samples: {}  errors: {} ({:.2}%)\n",
        report.size(),
        report.count_errors(),
        report.error_percent()
    ));
    output.push_str(&format!(
        "  average: {} ms  median: {} ms  90% line: {} ms\n",
        report.average(),
        report.median(),
        report.ninety_line()
    ));
    output.push_str(&format!(
        "  min: {} ms  max: {} ms\n",
        report.min(),
        report.max()
    ));

    if report.previous().is_some() {
        let diff = report.diff();
        output.push_str(&format!(
            "  vs previous: samples {}  average {} ms  median {} ms  errors {}%\n",
            signed(diff.size),
            signed(diff.average),
            signed(diff.median),
            signed_percent(diff.error_percent)
        ));
    }

    if report.endpoints().is_empty() {
        output.push('\n');
        return;
    }

    let width = report
        .endpoints()
        .iter()
        .map(|e| e.short_uri().chars().count())
        .max()
        .unwrap_or(20)
        .max("URI".len());

    output.push('\n');
    output.push_str(&format!(
        "  {:<width$}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}  {:>7}  {:>8}\n",
        "URI",
        "Samples",
        "Avg",
        "Median",
        "90%",
        "Min",
        "Max",
        "Err%",
        "ΔAvg",
        width = width
    ));
    output.push_str(&format!("  {}\n", "-".repeat(width + 82)));

    for endpoint in report.endpoints() {
        let key = endpoint.key();
        let delta = if report.has_previous_endpoint(key) {
            signed(report.endpoint_diff(key).average)
        } else {
            "-".to_string()
        };

        output.push_str(&format!(
            "  {:<width$}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}  {:>7.2}  {:>8}\n",
            endpoint.short_uri(),
            endpoint.size(),
            endpoint.average(),
            endpoint.median(),
            endpoint.ninety_line(),
            endpoint.min(),
            endpoint.max(),
            endpoint.error_percent(),
            delta,
            width = width
        ));

        if let Some(previous_code) = report.previous_http_code_if_changed(key) {
            output.push_str(&format!(
                "  {:<width$}  response codes {} (was {})\n",
                "",
                endpoint.http_code(),
                previous_code,
                width = width
            ));
        }
    }
    output.push('\n');
}

/// Format a build for human-readable terminal display
pub fn format_human_output(output: &PipelineOutput) -> String {
    let mut text = String::new();

    for line in output.outcome.log() {
        text.push_str(line);
        text.push('\n');
    }

    text.push('\n');
    text.push_str("Loadstat Results\n");
    text.push_str(&"=".repeat(RULE_WIDTH));
    text.push_str("\n\n");

    for set in &output.builds {
        for report in set.reports() {
            let verdict = verdict_for(output, report).map(|c| c.verdict);
            format_run(&mut text, report, verdict);
        }
    }

    text.push_str(&format!("Build status: {}\n", output.outcome.verdict()));
    text
}

/// JSON document for a classified build
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    /// Schema information
    #[serde(flatten)]
    pub schema: ReportSchema,
    /// Build verdict
    pub verdict: Verdict,
    /// Per-run verdicts
    pub classifications: &'a [Classification],
    /// Every run with its endpoints
    pub runs: Vec<RunSnapshot>,
    /// Build log
    pub log: &'a [String],
}

impl<'a> JsonOutput<'a> {
    /// Capture a pipeline result
    pub fn capture(output: &'a PipelineOutput) -> Self {
        Self {
            schema: ReportSchema::default(),
            verdict: output.outcome.verdict(),
            classifications: output.outcome.classifications(),
            runs: output
                .builds
                .iter()
                .flat_map(|set| BuildSnapshot::capture(set).runs)
                .collect(),
            log: output.outcome.log(),
        }
    }
}

/// Format a build as prettified JSON
pub fn format_json_output(output: &PipelineOutput) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::capture(output))
}
