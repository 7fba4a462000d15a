//! JMeter XML result trace parser
//!
//! Each top-level `<httpSample>` or `<sample>` element is one request:
//!
//! ```text
//! <testResults version="1.2">
//!   <httpSample t="14720" ts="1296846793179" s="true" lb="Home" rc="200"/>
//!   <sample t="278" ts="1296846847952" s="true" lb="Workgroup" rc="200">
//!     <httpSample t="120" lb="Workgroup/logo.png" .../>
//!   </sample>
//! </testResults>
//! ```
//!
//! Nested sub-samples (embedded resources, transaction children) belong to their
//! parent and are not counted separately.

use crate::error::ParseError;
use crate::parser::{ParserKind, ReportParser, file_name};
use crate::sink::DiagnosticSink;
use chrono::{DateTime, Utc};
use fxhash::FxHashMap;
use loadstat_report::{ReportFormat, RunReport, Sample};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Parser for XML `.jtl` traces
#[derive(Debug, Default, Clone, Copy)]
pub struct JtlXmlParser;

fn sample_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Quoted attribute values may contain `>`
    // Safety: this regex literal is guaranteed to compile
    RE.get_or_init(|| {
        Regex::new(r#"<(/?)(?:httpSample|sample)\b((?:[^>"']|"[^"]*"|'[^']*')*?)(/?)>"#).unwrap()
    })
}

fn attribute_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_][\w.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
    })
}

impl ReportParser for JtlXmlParser {
    fn kind(&self) -> ParserKind {
        ParserKind::JtlXml
    }

    fn parse_contents(
        &self,
        path: &Path,
        contents: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> RunReport {
        let mut report = RunReport::new(file_name(path), ReportFormat::Standard);
        let mut lines = LineCursor::default();
        let mut depth = 0usize;

        for tag in sample_tag_re().captures_iter(contents) {
            let closing = !tag[1].is_empty();
            let self_closing = !tag[3].is_empty();

            if closing {
                depth = depth.saturating_sub(1);
                continue;
            }

            if depth == 0 {
                let result = parse_sample(&tag[2])
                    .and_then(|s| report.add_sample(s).map_err(|e| e.to_string()));
                if let Err(reason) = result {
                    let offset = tag.get(0).map_or(0, |m| m.start());
                    let line = lines.line_at(contents, offset);
                    sink.error(ParseError::malformed(path, line, reason));
                }
            }

            if !self_closing {
                depth += 1;
            }
        }

        report
    }
}

/// Line numbers for increasing byte offsets, counting each newline once
#[derive(Debug, Default)]
struct LineCursor {
    offset: usize,
    newlines: usize,
}

impl LineCursor {
    fn line_at(&mut self, contents: &str, offset: usize) -> usize {
        if offset < self.offset {
            *self = LineCursor::default();
        }
        self.newlines += contents.as_bytes()[self.offset..offset]
            .iter()
            .filter(|b| **b == b'\n')
            .count();
        self.offset = offset;
        self.newlines + 1
    }
}

fn parse_sample(attributes: &str) -> Result<Sample, String> {
    let attrs: FxHashMap<&str, &str> = attribute_re()
        .captures_iter(attributes)
        .filter_map(|c| {
            let value = c.get(2).or_else(|| c.get(3))?;
            Some((c.get(1)?.as_str(), value.as_str()))
        })
        .collect();

    let label = attrs.get("lb").map(|l| unescape(l)).ok_or("missing lb attribute")?;
    let duration_text = attrs.get("t").ok_or("missing t attribute")?;
    let duration = duration_text
        .parse::<u64>()
        .map_err(|_| format!("invalid t: {:?}", duration_text))?;

    let timestamp = match attrs.get("ts") {
        Some(ts) => {
            let millis = ts
                .parse::<i64>()
                .map_err(|_| format!("invalid ts: {:?}", ts))?;
            DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| format!("timestamp out of range: {}", millis))?
        }
        None => DateTime::<Utc>::UNIX_EPOCH,
    };

    let mut sample = Sample::new(label, duration, timestamp);
    sample.successful = attrs.get("s").is_none_or(|s| s.eq_ignore_ascii_case("true"));
    if let Some(code) = attrs.get("rc") {
        sample.http_code = unescape(code);
    }
    Ok(sample)
}

/// Decode the predefined entities and numeric character references.
/// Unknown or malformed references are kept as written.
fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let decoded = rest
            .find(';')
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;
    use loadstat_report::ReportStats;

    const RESULTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testResults version="1.2">
<httpSample t="14720" lt="14720" ts="1296846793179" s="true" lb="Home" rc="200" rm="OK" tn="Thread Group 1-1"/>
<httpSample t="278" lt="278" ts="1296846847952" s="true" lb="Workgroup" rc="200" rm="OK" tn="Thread Group 1-1"/>
</testResults>
"#;

    const MULTI_LEVEL: &str = r#"<testResults version="1.2">
<sample t="500" ts="1296846793179" s="true" lb="Home" rc="200">
  <httpSample t="120" ts="1296846793180" s="true" lb="Home/logo.png" rc="200"/>
  <httpSample t="80" ts="1296846793181" s="false" lb="Home/style.css" rc="404">
    <responseData class="java.lang.String"></responseData>
  </httpSample>
</sample>
<sample t="300" ts="1296846793500" s="false" lb="Login" rc="500"/>
</testResults>
"#;

    fn parse(contents: &str) -> (RunReport, CollectingSink) {
        let mut sink = CollectingSink::new();
        let report =
            JtlXmlParser.parse_contents(Path::new("JMeterResults.jtl"), contents, &mut sink);
        (report, sink)
    }

    #[test]
    fn test_http_samples() {
        let (report, sink) = parse(RESULTS);
        assert_eq!(sink.errors().count(), 0);
        assert_eq!(report.endpoints().len(), 2);

        let home = &report.endpoint("Home").unwrap().samples()[0];
        assert_eq!(home.duration, 14720);
        assert_eq!(home.timestamp.timestamp_millis(), 1_296_846_793_179);
        assert!(home.successful);

        let workgroup = &report.endpoint("Workgroup").unwrap().samples()[0];
        assert_eq!(workgroup.duration, 278);
        assert_eq!(workgroup.timestamp.timestamp_millis(), 1_296_846_847_952);
    }

    #[test]
    fn test_nested_samples_count_once() {
        let (report, _) = parse(MULTI_LEVEL);
        let keys: Vec<_> = report.endpoints().iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec!["Home", "Login"]);
        assert_eq!(report.size(), 2);
        assert_eq!(report.count_errors(), 1);
    }

    #[test]
    fn test_same_label_keeps_arrival_order() {
        let mut xml = String::from("<testResults>\n");
        for t in [894, 1508, 1384, 1581, 996] {
            xml.push_str(&format!(
                "<sample t=\"{t}\" ts=\"0\" s=\"true\" lb=\"WebService(SOAP) Request\" rc=\"200\"/>\n"
            ));
        }
        xml.push_str("</testResults>\n");

        let (report, _) = parse(&xml);
        assert_eq!(report.endpoints().len(), 1);
        let durations: Vec<_> = report.endpoints()[0]
            .samples()
            .iter()
            .map(|s| s.duration)
            .collect();
        assert_eq!(durations, vec![894, 1508, 1384, 1581, 996]);
    }

    #[test]
    fn test_escaped_label() {
        let (report, _) = parse(r#"<httpSample t="5" lb="search?a=1&amp;b=2"/>"#);
        assert!(report.endpoint("search?a=1&b=2").is_some());
    }

    #[test]
    fn test_missing_duration_reported_with_line() {
        let (report, sink) = parse("<testResults>\n<httpSample lb=\"Home\"/>\n</testResults>\n");
        assert!(report.is_empty());
        let errors: Vec<_> = sink.errors().collect();
        assert!(matches!(errors[0], ParseError::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn test_gt_inside_attribute_value() {
        let (report, sink) = parse(
            r#"<httpSample t="7" lb="a > b" rc="200" s="false"/><httpSample t="3" lb='quoted' s="true"/>"#,
        );
        assert_eq!(sink.errors().count(), 0);

        let sample = &report.endpoint("a > b").unwrap().samples()[0];
        assert_eq!(sample.duration, 7);
        assert!(!sample.successful);
        assert!(report.endpoint("quoted").is_some());
    }

    #[test]
    fn test_numeric_character_references() {
        assert_eq!(unescape("line&#10;break &#x41;&#233;"), "line\nbreak Aé");
        assert_eq!(unescape("a &unknown; b & c"), "a &unknown; b & c");
        assert_eq!(unescape("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_large_trace_line_numbers() {
        let samples = 50_000;
        let mut xml = String::from("<testResults>\n");
        for i in 0..samples {
            xml.push_str(&format!(
                "<httpSample t=\"{}\" ts=\"1296846793179\" s=\"true\" lb=\"page-{}\" rc=\"200\"/>\n",
                i % 1000,
                i % 10
            ));
        }
        // Every other line in this tail is malformed
        for _ in 0..5_000 {
            xml.push_str("<httpSample lb=\"broken\"/>\n<httpSample t=\"1\" lb=\"ok\"/>\n");
        }
        xml.push_str("</testResults>\n");

        let (report, sink) = parse(&xml);

        assert_eq!(report.size(), samples + 5_000);
        let errors: Vec<_> = sink.errors().collect();
        assert_eq!(errors.len(), 5_000);
        assert!(matches!(
            errors[0],
            ParseError::MalformedLine { line, .. } if *line == samples + 2
        ));
        assert!(matches!(
            errors[4_999],
            ParseError::MalformedLine { line, .. } if *line == samples + 2 + 2 * 4_999
        ));
    }
}
