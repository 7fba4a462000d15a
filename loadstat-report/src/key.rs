//! Report and endpoint identity
//!
//! Endpoint keys are URL-safe tokens derived from the label the test tool wrote.
//! Report names drop the date suffix some tools append so that the same report
//! links across builds.

use regex::Regex;
use std::sync::OnceLock;

const HTTP_SCHEME: &str = "http:";

/// Derive the endpoint key from a raw URI or label.
///
/// Strips any leading `http:` and replaces every `/` with `_`. Distinct
/// labels can collapse to one key (`a/b` and `a_b`); their samples merge.
pub fn sanitize_key(uri: &str) -> String {
    uri.trim_start_matches(HTTP_SCHEME).replace('/', "_")
}

/// Rewrite a `-<digits>.xml` suffix to `.xml`.
///
/// `TEST-report-20120209.xml` becomes `TEST-report.xml`.
pub fn normalize_report_name(file_name: &str) -> String {
    static DATE_SUFFIX_RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    let re = DATE_SUFFIX_RE.get_or_init(|| Regex::new(r"-[0-9]*\.xml").unwrap());
    re.replace_all(file_name, ".xml").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_url() {
        assert_eq!(sanitize_key("http://host/app/login"), "__host_app_login");
        assert_eq!(sanitize_key("invalidCharacter/"), "invalidCharacter_");
        assert_eq!(sanitize_key("Home"), "Home");
    }

    #[test]
    fn test_sanitize_collision() {
        assert_eq!(sanitize_key("a/b"), sanitize_key("a_b"));
    }

    #[test]
    fn test_normalize_report_name() {
        assert_eq!(normalize_report_name("TEST-foo-20120209.xml"), "TEST-foo.xml");
        assert_eq!(normalize_report_name("results.jtl"), "results.jtl");
        assert_eq!(normalize_report_name("plain.xml"), "plain.xml");
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(uri in "[a-z:/_]{0,40}") {
            let once = sanitize_key(&uri);
            prop_assert_eq!(sanitize_key(&once), once.clone());
            prop_assert!(!once.contains('/'));
        }
    }
}
