//! Orchestrates a migration run.

mod error;

pub use error::RunnerError;

use crate::cache::ReferenceCache;
use crate::compose::DescriptionRenderer;
use crate::config::MigratorConfig;
use crate::dump::write_issue_dump;
use crate::gitlab::{DestinationTracker, GitLabClient};
use crate::http::build_client;
use crate::migration::{build_record, migrate_issue, MigrationContext};
use crate::phabricator::{PhabricatorClient, SourceTracker};
use crate::summary::RunSummary;
use tracing::{error, info, warn};

/// Migrates every matching Phabricator task of one instance into one GitLab
/// project.
pub struct Runner {
    config: MigratorConfig,
    source: PhabricatorClient,
    destination: GitLabClient,
}

impl Runner {
    /// Builds a runner from the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Client`] if the HTTP client can't be built.
    pub fn new(config: MigratorConfig) -> Result<Self, RunnerError> {
        let http = build_client(config.request_timeout())?;
        let source = PhabricatorClient::new(
            http.clone(),
            config.source_url().clone(),
            config.source_token().to_string(),
        );
        let destination = GitLabClient::new(
            http,
            config.destination_url().clone(),
            config.destination_token().to_string(),
        );
        Ok(Self {
            config,
            source,
            destination,
        })
    }

    /// Executes the full migration flow.
    ///
    /// # Errors
    ///
    /// See [`run_migration`].
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        run_migration(&self.source, &self.destination, &self.config).await
    }
}

/// Migrates every task matching the configured status, one at a time.
///
/// Each task is fetched, migrated and dumped before the next one starts.
/// A failed upload, duplicate check or creation is recorded in the summary
/// and the run moves on.
///
/// # Errors
///
/// Returns [`RunnerError::Upstream`] if the task list can't be fetched, or if
/// fetching one task's history, author, comment authors or project fails
/// while `keep-going` is off. Returns [`RunnerError::Dump`] if a dump can't
/// be written.
pub async fn run_migration<S, D>(
    source: &S,
    destination: &D,
    config: &MigratorConfig,
) -> Result<RunSummary, RunnerError>
where
    S: SourceTracker + ?Sized,
    D: DestinationTracker + ?Sized,
{
    let mut summary = RunSummary::new(config.dry_run());
    let renderer = DescriptionRenderer::new()?;

    info!(status = %config.status(), "Searching issues");
    let issues = source
        .search_issues(config.status())
        .await
        .map_err(|e| RunnerError::Upstream {
            context: "issue list".to_string(),
            source: e,
        })?;

    if issues.is_empty() {
        warn!(status = %config.status(), "No issues found");
        return Ok(summary);
    }

    info!(count = issues.len(), "Found issues");
    summary.issues_found = issues.len();

    let ctx = MigrationContext {
        source,
        destination,
        renderer: &renderer,
        source_api_url: config.source_url(),
        staging_dir: config.staging_dir(),
        dry_run: config.dry_run(),
    };
    let mut cache = ReferenceCache::new();

    for issue in issues {
        let monogram = issue.monogram();

        let record = match build_record(source, &mut cache, issue).await {
            Ok(record) => record,
            Err(e) if config.keep_going() => {
                error!(issue = %monogram, error = %e, "Failed to fetch issue, continuing");
                summary.record_fetch_failure(&monogram, &e.to_string());
                continue;
            }
            Err(e) => {
                return Err(RunnerError::Upstream {
                    context: monogram,
                    source: e,
                })
            }
        };

        let outcome = migrate_issue(&ctx, &record).await;
        write_issue_dump(config.output_dir(), &record, outcome.draft.as_ref()).await?;
        summary.record_outcome(&outcome);
    }

    info!(
        created = summary.issues_created,
        skipped = summary.issues_skipped,
        failed = summary.issues_failed,
        users = cache.user_count(),
        projects = cache.project_count(),
        "Migration run finished"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;
    use crate::migration::{FailureStage, MigrationStatus};
    use crate::test_support::{task, FakeDestination, FakeSource};
    use tempfile::TempDir;

    fn config(temp: &TempDir, dry_run: bool, keep_going: bool) -> MigratorConfig {
        ConfigFile {
            source_url: Some("https://phab.example.com/api/".to_string()),
            source_token: Some("api-token".to_string()),
            destination_url: Some("https://gitlab.example.com/api/v4/projects/7".to_string()),
            destination_token: Some("glpat".to_string()),
            dry_run: Some(dry_run),
            keep_going: Some(keep_going),
            ..ConfigFile::default()
        }
        .into_config()
        .unwrap()
        .with_directories(temp.path().join("out"), temp.path().join("files"))
    }

    fn two_issues() -> FakeSource {
        FakeSource::new()
            .with_user("PHID-USER-A", "alice")
            .with_task(task(1, "First", "one", "PHID-USER-A", "public"))
            .with_task(task(2, "Second", "two", "PHID-USER-A", "public"))
    }

    #[tokio::test]
    async fn create_failure_does_not_stop_next_issue() {
        let temp = TempDir::new().unwrap();
        let source = two_issues();
        let destination = FakeDestination::new().failing_create_for("T1: First");

        let summary = run_migration(&source, &destination, &config(&temp, false, false))
            .await
            .unwrap();

        assert_eq!(summary.issues_found, 2);
        assert_eq!(summary.issues_failed, 1);
        assert_eq!(summary.issues_created, 1);
        assert!(summary.has_failures());

        // Only the created issue gets a forwarding comment
        let posted = source.posted_comments();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].0, "PHID-TASK-2");

        // Both issues are dumped; the failed one still has its draft
        assert!(temp.path().join("out/T1-data.txt").exists());
        assert!(temp.path().join("out/T2-issue.json").exists());
    }

    #[tokio::test]
    async fn fetch_failure_aborts_run() {
        let temp = TempDir::new().unwrap();
        let source = FakeSource::new()
            .with_user("PHID-USER-A", "alice")
            .with_task(task(1, "Orphan", "", "PHID-USER-GHOST", "public"))
            .with_task(task(2, "Second", "two", "PHID-USER-A", "public"));
        let destination = FakeDestination::new();

        let result = run_migration(&source, &destination, &config(&temp, false, false)).await;

        assert!(matches!(
            result,
            Err(RunnerError::Upstream { ref context, .. }) if context == "T1"
        ));
        assert!(destination.created().is_empty());
    }

    #[tokio::test]
    async fn keep_going_records_fetch_failure() {
        let temp = TempDir::new().unwrap();
        let source = FakeSource::new()
            .with_user("PHID-USER-A", "alice")
            .with_task(task(1, "Orphan", "", "PHID-USER-GHOST", "public"))
            .with_task(task(2, "Second", "two", "PHID-USER-A", "public"));
        let destination = FakeDestination::new();

        let summary = run_migration(&source, &destination, &config(&temp, false, true))
            .await
            .unwrap();

        assert_eq!(summary.issues_failed, 1);
        assert_eq!(summary.issues_created, 1);
        assert!(matches!(
            summary.reports[0].status,
            MigrationStatus::Failed {
                stage: FailureStage::Fetch,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn dry_run_writes_dumps_only() {
        let temp = TempDir::new().unwrap();
        let source = two_issues();
        let destination = FakeDestination::new();

        let summary = run_migration(&source, &destination, &config(&temp, true, false))
            .await
            .unwrap();

        assert!(summary.dry_run);
        assert_eq!(summary.issues_previewed, 2);
        assert!(summary.all_success());
        assert!(destination.created().is_empty());
        assert!(source.posted_comments().is_empty());
        assert!(temp.path().join("out/T2-data.txt").exists());
    }

    #[tokio::test]
    async fn no_issues_is_empty_summary() {
        let temp = TempDir::new().unwrap();
        let source = FakeSource::new();
        let destination = FakeDestination::new();

        let summary = run_migration(&source, &destination, &config(&temp, false, false))
            .await
            .unwrap();

        assert_eq!(summary.issues_found, 0);
        assert!(summary.reports.is_empty());
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn runner_builds_clients_from_config() {
        let temp = TempDir::new().unwrap();
        assert!(Runner::new(config(&temp, false, false)).is_ok());
    }
}
