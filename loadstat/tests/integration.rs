//! Integration tests for Loadstat
//!
//! Parse real result files from disk, link builds and classify them end to end.

use chrono::{DateTime, Utc};
use loadstat::prelude::*;
use loadstat::{
    AggregateParser, BuildCache, JtlXmlParser, ReportFormat, Sample, SummarizerParser,
    VerdictReason, classify,
};
use loadstat_cli::{PipelineConfig, ParserConfig, format_json_output, run_pipeline};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn sample(uri: &str, duration: u64, successful: bool) -> Sample {
    Sample::new(uri, duration, DateTime::<Utc>::UNIX_EPOCH).with_success(successful)
}

fn thresholds(fail: i32, unstable: i32, sla_millis: u64) -> Thresholds {
    Thresholds {
        fail_threshold: fail,
        unstable_threshold: unstable,
        sla_millis,
    }
}

fn scenario_b() -> RunReport {
    let mut report = RunReport::new("results.jtl", ReportFormat::Standard);
    for duration in [100, 200, 300] {
        report.add_sample(sample("A", duration, true)).unwrap();
    }
    report.add_sample(sample("B", 50, false)).unwrap();
    report
}

#[test]
fn test_single_endpoint_statistics() {
    let report = scenario_b();
    let a = report.endpoint("A").unwrap();

    assert_eq!(a.size(), 3);
    assert_eq!(a.average(), 200);
    assert_eq!(a.median(), 200);
    assert_eq!(a.ninety_line(), 300);
    assert_eq!(a.min(), 100);
    assert_eq!(a.max(), 300);
    assert_eq!(a.error_percent(), 0.0);
}

#[test]
fn test_run_statistics_over_flattened_samples() {
    let report = scenario_b();

    assert_eq!(report.size(), 4);
    assert_eq!(report.count_errors(), 1);
    assert_eq!(report.error_percent(), 25.0);
    assert_eq!(report.average(), 162);
    assert_eq!(report.median(), 200);
    assert_eq!(report.ninety_line(), 300);
    assert_eq!(report.min(), 50);
    assert_eq!(report.max(), 300);
}

#[test]
fn test_aggregate_file_uses_total_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "aggregate.csv",
        "sampler_label,aggregate_report_count,average,aggregate_report_median,aggregate_report_90%_line,aggregate_report_min,aggregate_report_max,aggregate_report_error%\n\
         Home,10,200,180,300,50,400,0.0\n\
         TOTAL,10,200,180,300,50,400,0.0\n",
    );

    let mut sink = CollectingSink::new();
    let reports = AggregateParser.parse(&[path], &mut sink);
    assert_eq!(sink.errors().count(), 0);

    let report = &reports[0];
    assert_eq!(report.endpoints().len(), 1);
    assert_eq!(report.size(), 10);
    assert_eq!(report.average(), 200);
    assert_eq!(report.median(), 180);
    assert_eq!(report.ninety_line(), 300);
    assert_eq!(report.error_percent(), 0.0);
    assert_eq!(report.endpoint("Home").unwrap().error_percent(), 0.0);
}

#[test]
fn test_jtl_xml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "JMeterResults.jtl",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<testResults version="1.2">
<httpSample t="14720" lt="14720" ts="1296846793179" s="true" lb="Home" rc="200" rm="OK"/>
<httpSample t="278" lt="278" ts="1296846847952" s="true" lb="Workgroup" rc="200" rm="OK"/>
</testResults>
"#,
    );

    let mut sink = CollectingSink::new();
    let reports = JtlXmlParser.parse(&[path], &mut sink);
    let report = &reports[0];

    assert_eq!(report.source_file_name(), "JMeterResults.jtl");
    assert_eq!(report.endpoint("Home").unwrap().average(), 14720);
    assert_eq!(report.endpoint("Workgroup").unwrap().average(), 278);
    assert_eq!(report.size(), 2);
    assert_eq!(report.http_code(), "");
}

#[test]
fn test_summarizer_last_line_wins() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "jmeter.log",
        "\
INFO  - jmeter.reporters.Summariser: summary =    60 in  30.1s =    2.0/s Avg:   240 Min:   102 Max:  1100 Err:     1 (1.67%)
INFO  - jmeter.reporters.Summariser: summary +    60 in  30.1s =    2.0/s Avg:   999 Min:   999 Max:   999 Err:    60 (100.00%)
INFO  - jmeter.reporters.Summariser: summary =   120 in  62.3s =    1.9/s Avg:   254 Min:   102 Max:  1410 Err:     3 (4.00%)
INFO  - jmeter.reporters.Summariser: login =    40 in  30.0s =    1.3/s Avg:   120 Min:    80 Max:   300 Err:     0 (2.00%)
",
    );

    let mut sink = CollectingSink::new();
    let reports = SummarizerParser.parse(&[path], &mut sink);
    let report = &reports[0];

    let summary = report.endpoint("summary").unwrap();
    assert_eq!(summary.size(), 1);
    assert_eq!(summary.average(), 254);
    // (4 + 2) / 2
    assert!((report.error_percent() - 3.0).abs() < 1e-9);
}

#[test]
fn test_unreadable_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "good.jtl", "<testResults><sample t=\"5\" lb=\"A\" s=\"true\"/></testResults>");
    let missing = dir.path().join("missing.jtl");

    let mut sink = CollectingSink::new();
    let reports = JtlXmlParser.parse(&[missing, good], &mut sink);

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].source_file_name(), "good.jtl");
    assert_eq!(sink.errors().count(), 1);
}

#[test]
fn test_classifier_cases() {
    let report = scenario_b();

    let fail = classify_run(&report, &thresholds(20, 10, 1000));
    assert_eq!(fail.verdict, Verdict::Fail);
    assert_eq!(fail.reason, VerdictReason::ErrorsAboveFail { threshold: 20 });

    let unstable = classify_run(&report, &thresholds(30, 20, 1000));
    assert_eq!(unstable.verdict, Verdict::Unstable);

    // Equal to the threshold is not above it
    let equal = classify_run(&report, &thresholds(25, 25, 1000));
    assert_eq!(equal.verdict, Verdict::Success);

    let sla = classify_run(&report, &thresholds(-1, -1, 299));
    assert_eq!(sla.verdict, Verdict::Fail);
    assert_eq!(sla.reason, VerdictReason::SlaExceeded { sla_millis: 299 });

    let endpoint = classify("A", report.endpoint("A").unwrap(), &thresholds(0, 0, 1000));
    assert_eq!(endpoint.verdict, Verdict::Success);
}

#[test]
fn test_build_keeps_worst_verdict() {
    let mut outcome = BuildOutcome::new();
    let report = scenario_b();

    outcome.record(classify_run(&report, &thresholds(-1, 10, 1000)));
    assert_eq!(outcome.verdict(), Verdict::Unstable);
    outcome.record(classify_run(&report, &thresholds(-1, -1, 100)));
    assert_eq!(outcome.verdict(), Verdict::Fail);
    outcome.record(classify_run(&report, &Thresholds::default()));
    assert_eq!(outcome.verdict(), Verdict::Fail);

    assert_eq!(outcome.classifications().len(), 3);
    assert!(outcome.log().iter().any(|l| l.ends_with("Build status is: FAILURE")));
}

#[test]
fn test_linked_builds_report_diffs() {
    let mut previous = RunReport::new("TEST-suite.jtl", ReportFormat::Standard);
    previous.add_sample(sample("A", 100, true)).unwrap();
    previous.add_sample(sample("Gone", 10, true)).unwrap();
    let previous = RunSet::new(vec![previous]);

    let mut current = RunReport::new("TEST-suite.jtl", ReportFormat::Standard);
    current.add_sample(sample("A", 160, true)).unwrap();
    current.add_sample(sample("New", 20, true)).unwrap();
    let current = RunSet::linked(vec![current], &previous);

    let run = current.require("TEST-suite.jtl").unwrap();
    assert_eq!(run.diff().size, 0);
    assert_eq!(run.endpoint_diff("A").average, 60);
    assert!(!run.has_previous_endpoint("New"));
    assert!(run.endpoint_diff("New").is_zero());
}

#[test]
fn test_dropped_previous_build_zeroes_diffs() {
    let mut current = RunReport::new("r.jtl", ReportFormat::Standard);
    current.add_sample(sample("A", 160, true)).unwrap();

    let current = {
        let mut previous = RunReport::new("r.jtl", ReportFormat::Standard);
        previous.add_sample(sample("A", 100, true)).unwrap();
        let previous = RunSet::new(vec![previous]);
        RunSet::linked(vec![current], &previous)
    };

    let run = current.require("r.jtl").unwrap();
    assert!(run.previous().is_none());
    assert!(run.diff().is_zero());
}

#[test]
fn test_build_cache_parses_once() {
    let mut cache: BuildCache<&str> = BuildCache::new();
    let mut parses = 0;

    let first = cache.get_or_insert_with("build-41", || {
        parses += 1;
        RunSet::new(vec![scenario_b()])
    });
    let second = cache.get_or_insert_with("build-41", || {
        parses += 1;
        RunSet::new(Vec::new())
    });

    assert_eq!(parses, 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_pipeline_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let current = dir.path().join("current");
    let previous = dir.path().join("previous");
    fs::create_dir_all(&current).unwrap();
    fs::create_dir_all(&previous).unwrap();

    write(
        &previous,
        "results.jtl",
        "<testResults>\n<sample t=\"100\" lb=\"Home\" s=\"true\" rc=\"200\"/>\n</testResults>\n",
    );
    write(
        &current,
        "results.jtl",
        "<testResults>\n\
         <sample t=\"150\" lb=\"Home\" s=\"true\" rc=\"200\"/>\n\
         <sample t=\"250\" lb=\"Home\" s=\"false\" rc=\"500\"/>\n\
         </testResults>\n",
    );

    let config = PipelineConfig {
        thresholds: thresholds(60, 40, 1000),
        parsers: vec![ParserConfig {
            kind: ParserKind::JtlXml,
            files: vec![current.join("*.jtl").to_string_lossy().into_owned()],
            previous: vec![previous.join("*.jtl").to_string_lossy().into_owned()],
        }],
    };

    let output = run_pipeline(&config);
    assert_eq!(output.outcome.verdict(), Verdict::Unstable);

    let run = output.builds[0].require("results.jtl").unwrap();
    assert_eq!(run.error_percent(), 50.0);
    assert_eq!(run.diff().size, 1);
    assert_eq!(run.endpoint_diff("Home").average, 100);

    let json: serde_json::Value =
        serde_json::from_str(&format_json_output(&output).unwrap()).unwrap();
    assert_eq!(json["verdict"], "unstable");
    assert_eq!(json["runs"][0]["diff"]["size"], 1);
}
