//! Build-level report sets
//!
//! A [`RunSet`] holds every report of one build. Reports are linked to the previous
//! build's set by normalized source file name before they are frozen behind `Arc`.

use crate::error::ReportError;
use crate::key::normalize_report_name;
use crate::run::RunReport;
use fxhash::FxHashMap;
use std::hash::Hash;
use std::sync::Arc;

/// All reports of one build, in input order
#[derive(Debug, Clone, Default)]
pub struct RunSet {
    reports: Vec<Arc<RunReport>>,
    by_name: FxHashMap<String, usize>,
}

impl RunSet {
    /// Freeze reports without linking them
    pub fn new(reports: Vec<RunReport>) -> Self {
        Self::assemble(reports, None)
    }

    /// Freeze reports, linking each to the previous build's report of the same name
    pub fn linked(reports: Vec<RunReport>, previous: &RunSet) -> Self {
        Self::assemble(reports, Some(previous))
    }

    fn assemble(reports: Vec<RunReport>, previous: Option<&RunSet>) -> Self {
        let mut set = RunSet::default();
        let mut linked = 0usize;

        for mut report in reports {
            let name = normalize_report_name(report.source_file_name());
            if let Some(counterpart) = previous.and_then(|p| p.get(&name)) {
                report.link_previous(counterpart);
                linked += 1;
            }

            if set.by_name.contains_key(&name) {
                tracing::warn!(report = %name, "duplicate report name, keeping the first for lookups");
            } else {
                set.by_name.insert(name, set.reports.len());
            }
            set.reports.push(Arc::new(report));
        }

        if previous.is_some() {
            tracing::debug!(linked, total = set.reports.len(), "linked build to previous build");
        }
        set
    }

    /// Report by source file name (normalized as at link time)
    pub fn get(&self, file_name: &str) -> Option<&Arc<RunReport>> {
        self.by_name
            .get(&normalize_report_name(file_name))
            .map(|&i| &self.reports[i])
    }

    /// Report by source file name, as an error when absent
    pub fn require(&self, file_name: &str) -> Result<&Arc<RunReport>, ReportError> {
        self.get(file_name)
            .ok_or_else(|| ReportError::NotFound(file_name.to_string()))
    }

    /// Reports in input order
    pub fn reports(&self) -> &[Arc<RunReport>] {
        &self.reports
    }

    /// Number of reports
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether the build produced no reports
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

/// Caller-owned memo of parsed builds, keyed by build identity.
///
/// Parsing a build once and handing out the same `Arc` lets the next build link
/// against it without re-reading its files.
#[derive(Debug)]
pub struct BuildCache<K> {
    builds: FxHashMap<K, Arc<RunSet>>,
}

impl<K: Hash + Eq> Default for BuildCache<K> {
    fn default() -> Self {
        Self {
            builds: FxHashMap::default(),
        }
    }
}

impl<K: Hash + Eq> BuildCache<K> {
    /// Empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached set for `build`, if present
    pub fn get(&self, build: &K) -> Option<Arc<RunSet>> {
        self.builds.get(build).cloned()
    }

    /// Cached set for `build`, building it with `f` on first request
    pub fn get_or_insert_with(&mut self, build: K, f: impl FnOnce() -> RunSet) -> Arc<RunSet> {
        self.builds
            .entry(build)
            .or_insert_with(|| Arc::new(f()))
            .clone()
    }

    /// Forget a build. Reports linked to it see zero diffs once the last `Arc` drops.
    pub fn evict(&mut self, build: &K) -> Option<Arc<RunSet>> {
        self.builds.remove(build)
    }

    /// Number of cached builds
    pub fn len(&self) -> usize {
        self.builds.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::ReportFormat;
    use crate::sample::Sample;
    use crate::stats::ReportStats;
    use chrono::{DateTime, Utc};

    fn report(name: &str, durations: &[u64]) -> RunReport {
        let mut report = RunReport::new(name, ReportFormat::Standard);
        for &d in durations {
            report
                .add_sample(Sample::new("Home", d, DateTime::<Utc>::UNIX_EPOCH))
                .unwrap();
        }
        report
    }

    #[test]
    fn test_links_by_file_name() {
        let previous = RunSet::new(vec![report("a.jtl", &[100]), report("b.jtl", &[10])]);
        let current = RunSet::linked(
            vec![report("a.jtl", &[300]), report("c.jtl", &[5])],
            &previous,
        );

        let a = current.require("a.jtl").unwrap();
        assert_eq!(a.diff().average, 200);
        assert_eq!(a.endpoint_diff("Home").average, 200);

        let c = current.get("c.jtl").unwrap();
        assert!(c.previous().is_none());
        assert!(c.diff().is_zero());
    }

    #[test]
    fn test_links_date_stamped_names() {
        let previous = RunSet::new(vec![report("TEST-suite-20120208.xml", &[100])]);
        let current = RunSet::linked(vec![report("TEST-suite-20120209.xml", &[150])], &previous);

        let linked = current.get("TEST-suite.xml").unwrap();
        assert_eq!(linked.diff().average, 50);
    }

    #[test]
    fn test_preserves_input_order() {
        let set = RunSet::new(vec![report("z", &[1]), report("a", &[2])]);
        let names: Vec<_> = set.reports().iter().map(|r| r.source_file_name()).collect();
        assert_eq!(names, vec!["z", "a"]);
        assert!(matches!(set.require("missing"), Err(ReportError::NotFound(_))));
    }

    #[test]
    fn test_build_cache_memoizes() {
        let mut cache = BuildCache::new();
        let mut builds = 0;

        let first = cache.get_or_insert_with(41u32, || {
            builds += 1;
            RunSet::new(vec![report("a.jtl", &[100])])
        });
        let second = cache.get_or_insert_with(41u32, || {
            builds += 1;
            RunSet::default()
        });

        assert_eq!(builds, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_evicted_build_unlinks() {
        let mut cache = BuildCache::new();
        let previous = cache.get_or_insert_with("build-1", || {
            RunSet::new(vec![report("a.jtl", &[100])])
        });
        let current = RunSet::linked(vec![report("a.jtl", &[300])], &previous);
        drop(previous);

        assert_eq!(current.require("a.jtl").unwrap().size(), 1);
        assert_eq!(current.require("a.jtl").unwrap().diff().average, 200);

        cache.evict(&"build-1");
        assert!(cache.is_empty());
        assert!(current.require("a.jtl").unwrap().diff().is_zero());
    }
}
