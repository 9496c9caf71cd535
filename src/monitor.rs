//! One monitor pass: fixtures -> desired state, cluster -> actual state, then classify.

use std::path::PathBuf;

use crate::cluster::{ClusterState, observe};
use crate::config::{ConfigError, MonitorConfig};
use crate::core::delta::ReconciliationReport;
use crate::core::error::{ReconcileError, ReconcileResult};
use crate::core::ingest::{FixtureIngestor, FixtureSource};
use crate::mapping::generator::build_desired_state;
use crate::notify::{ReportSink, SendmailSink, StdoutSink, error_fragment};
use crate::report::{ReportFormat, ReportFormatter};

/// Where a finished report goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// HTML mail to every configured recipient.
    Mail,
    /// Rendered to stdout in the given format; nothing is mailed.
    DryRun(ReportFormat),
}

impl DeliveryMode {
    /// Mail needs recipients; this is checked at startup, before any fixture or
    /// cluster work, so a misconfigured run fails even when the report would be clean.
    pub fn resolve(
        dry_run: bool,
        format: ReportFormat,
        config: &MonitorConfig,
    ) -> Result<Self, ConfigError> {
        if dry_run {
            return Ok(DeliveryMode::DryRun(format));
        }
        config.require_recipients()?;
        Ok(DeliveryMode::Mail)
    }

    pub fn format(self) -> ReportFormat {
        match self {
            DeliveryMode::Mail => ReportFormat::Html,
            DeliveryMode::DryRun(format) => format,
        }
    }

    pub fn sink(self, config: &MonitorConfig) -> Box<dyn ReportSink> {
        match self {
            DeliveryMode::Mail => Box::new(SendmailSink::new(
                config.hostname.as_str(),
                &config.recipients,
            )),
            DeliveryMode::DryRun(_) => Box::new(StdoutSink),
        }
    }
}

/// Runs the whole pipeline. Any fixture or cluster failure returns before
/// classification starts, so a report is either complete or absent.
pub fn run_monitor<S, C>(
    config: &MonitorConfig,
    fixture_paths: &[PathBuf],
    source: &S,
    cluster: &C,
) -> ReconcileResult<ReconciliationReport>
where
    S: FixtureSource,
    C: ClusterState + ?Sized,
{
    let fixtures = FixtureIngestor::new(source, config.workers).ingest(fixture_paths)?;
    let desired = build_desired_state(&fixtures, &config.namespace);
    let actual = observe(cluster, &config.namespace)?;

    let report = desired.reconcile(&actual, &config.exemption);
    tracing::info!(
        branch = %config.branch,
        fixtures = fixtures.len(),
        findings = report.finding_count(),
        "monitor pass complete"
    );
    Ok(report)
}

/// Hand a finished report to `sink`. A clean report is never delivered.
/// Returns whether anything was sent.
pub fn deliver_report(
    report: &ReconciliationReport,
    formatter: &ReportFormatter<'_>,
    format: ReportFormat,
    sink: &dyn ReportSink,
) -> ReconcileResult<bool> {
    if report.is_clean() {
        tracing::info!("cluster matches fixtures, nothing to report");
        return Ok(false);
    }
    let body = formatter.render(report, format)?;
    sink.deliver(&formatter.subject(), &body)?;
    tracing::info!(findings = report.finding_count(), "report delivered");
    Ok(true)
}

/// Send the red error notice for a run that failed before producing a report.
pub fn notify_failure(
    err: &ReconcileError,
    formatter: &ReportFormatter<'_>,
    sink: &dyn ReportSink,
) -> ReconcileResult<()> {
    sink.deliver(&formatter.subject(), &error_fragment(&err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::env::VarError;
    use std::path::Path;

    use crate::core::error::ReconcileError;
    use crate::core::fixture::{DataSource, FixtureRecord};
    use crate::core::delta::{RenamePair, ResourceDiff};
    use crate::core::types::ResourceKind;

    struct MapSource(HashMap<PathBuf, FixtureRecord>);

    impl FixtureSource for MapSource {
        fn load_fixture(&self, path: &Path) -> ReconcileResult<FixtureRecord> {
            self.0.get(path).cloned().ok_or_else(|| ReconcileError::FixtureRead {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    struct FakeCluster {
        indices: Vec<&'static str>,
        aliases: Vec<&'static str>,
        calls: Cell<usize>,
    }

    impl ClusterState for FakeCluster {
        fn list_indices(&self) -> ReconcileResult<Vec<String>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.indices.iter().map(|s| s.to_string()).collect())
        }

        fn list_aliases(&self) -> ReconcileResult<Vec<String>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.aliases.iter().map(|s| s.to_string()).collect())
        }
    }

    fn mk_config() -> MonitorConfig {
        MonitorConfig::from_reader(|key| match key {
            "ES_URL" => Ok("http://es:9200".to_string()),
            "BRANCH" => Ok("test".to_string()),
            "WORKERS" => Ok("2".to_string()),
            _ => Err(VarError::NotPresent),
        })
        .unwrap()
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: RefCell<Vec<(String, String)>>,
    }

    impl ReportSink for RecordingSink {
        fn deliver(&self, subject: &str, body: &str) -> ReconcileResult<()> {
            self.sent
                .borrow_mut()
                .push((subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn mk_report(missing: &[&str]) -> ReconciliationReport {
        let mut indices = ResourceDiff::empty(ResourceKind::Index);
        indices.missing = missing.iter().map(|s| s.to_string()).collect();
        ReconciliationReport::new(indices, ResourceDiff::empty(ResourceKind::Alias))
    }

    fn mk_ds(slug: &str, suffix: &str) -> DataSource {
        DataSource {
            slug: slug.to_string(),
            index_suffix: suffix.to_string(),
            projects: Some(vec![serde_yaml::Value::String("p".into())]),
            endpoints: None,
        }
    }

    fn mk_source(records: Vec<(&str, FixtureRecord)>) -> (MapSource, Vec<PathBuf>) {
        let paths = records.iter().map(|(p, _)| PathBuf::from(p)).collect();
        let map = records
            .into_iter()
            .map(|(p, fx)| (PathBuf::from(p), fx.with_origin(p)))
            .collect();
        (MapSource(map), paths)
    }

    #[test]
    fn end_to_end_classifies_missing_extra_and_renamed() {
        let acme = FixtureRecord {
            data_sources: vec![mk_ds("git", ""), mk_ds("jira", "-v2"), mk_ds("slack", "")],
            ..FixtureRecord::new("acme")
        };
        let (source, paths) = mk_source(vec![("acme.yaml", acme)]);
        let cluster = FakeCluster {
            indices: vec!["sds-acme-jira", "sds-acme-old", "sds-acme-team-slack", "sds-acme-git-raw"],
            aliases: vec![],
            calls: Cell::new(0),
        };

        let report = run_monitor(&mk_config(), &paths, &source, &cluster).unwrap();

        assert_eq!(
            report.missing_indices(),
            ["sds-acme-git".to_string(), "sds-acme-slack".to_string()]
        );
        assert_eq!(report.extra_indices(), ["sds-acme-old".to_string()]);
        assert_eq!(
            report.renamed_indices(),
            [RenamePair::new("sds-acme-jira", "sds-acme-jira-v2")]
        );
        assert_eq!(cluster.calls.get(), 2);
    }

    #[test]
    fn duplicate_fixture_stops_before_cluster_is_queried() {
        let (source, paths) = mk_source(vec![
            ("a/acme.yaml", FixtureRecord::new("acme")),
            ("b/acme.yaml", FixtureRecord::new("acme")),
        ]);
        let cluster = FakeCluster {
            indices: vec![],
            aliases: vec![],
            calls: Cell::new(0),
        };

        let err = run_monitor(&mk_config(), &paths, &source, &cluster).unwrap_err();

        assert!(matches!(err, ReconcileError::DuplicateSlug { .. }));
        assert_eq!(cluster.calls.get(), 0);
    }

    #[test]
    fn mail_without_recipients_is_rejected_up_front() {
        let config = mk_config();
        assert!(config.recipients.is_empty());

        let err = DeliveryMode::resolve(false, ReportFormat::Text, &config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref var) if var == "RECIPIENTS"));

        let mode = DeliveryMode::resolve(true, ReportFormat::Json, &config).unwrap();
        assert_eq!(mode, DeliveryMode::DryRun(ReportFormat::Json));
        assert_eq!(mode.format(), ReportFormat::Json);
    }

    #[test]
    fn mail_mode_always_renders_html() {
        let mut config = mk_config();
        config.recipients = vec!["ops@example.org".to_string()];

        let mode = DeliveryMode::resolve(false, ReportFormat::Toon, &config).unwrap();
        assert_eq!(mode, DeliveryMode::Mail);
        assert_eq!(mode.format(), ReportFormat::Html);
    }

    #[test]
    fn clean_report_delivers_nothing() {
        let sink = RecordingSink::default();
        let formatter = ReportFormatter::new("test");

        let sent = deliver_report(&mk_report(&[]), &formatter, ReportFormat::Text, &sink).unwrap();

        assert!(!sent);
        assert!(sink.sent.borrow().is_empty());
    }

    #[test]
    fn findings_are_rendered_in_the_requested_format() {
        let sink = RecordingSink::default();
        let formatter = ReportFormatter::new("test");

        let sent =
            deliver_report(&mk_report(&["sds-a-git"]), &formatter, ReportFormat::Html, &sink).unwrap();

        assert!(sent);
        let sent = sink.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "ES test monitor status");
        assert!(sent[0].1.contains("<p style=\"color:red\">missing 1 indices:</p>"));
    }

    #[test]
    fn failure_notice_is_the_red_error_fragment() {
        let sink = RecordingSink::default();
        let err = ReconcileError::NoFixtures;

        notify_failure(&err, &ReportFormatter::new("test"), &sink).unwrap();

        let sent = sink.sent.borrow();
        assert_eq!(sent[0].0, "ES test monitor status");
        assert!(sent[0].1.contains("ES monitor error:"));
        assert!(sent[0].1.contains("color:red"));
        assert!(sent[0].1.contains("no enabled fixtures read"));
    }
}
