//! Run summary types.

use super::report::IssueReport;
use crate::migration::{FailureStage, MigrationOutcome, MigrationStatus, WritebackStatus};

/// Summary of a complete run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of tasks returned by the source search.
    pub issues_found: usize,

    /// Number of GitLab issues created.
    pub issues_created: usize,

    /// Number of tasks skipped because they were already migrated.
    pub issues_skipped: usize,

    /// Number of tasks composed in dry-run mode.
    pub issues_previewed: usize,

    /// Number of tasks whose migration failed.
    pub issues_failed: usize,

    /// Number of created issues whose forwarding comment could not be posted.
    pub writebacks_failed: usize,

    /// Whether this was a dry run.
    pub dry_run: bool,

    /// One entry per processed task, in processing order.
    pub reports: Vec<IssueReport>,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Updates the summary with the outcome of one task.
    pub fn record_outcome(&mut self, outcome: &MigrationOutcome) {
        match &outcome.status {
            MigrationStatus::Created { writeback, .. } => {
                self.issues_created += 1;
                if matches!(writeback, WritebackStatus::Failed { .. }) {
                    self.writebacks_failed += 1;
                }
            }
            MigrationStatus::Skipped { .. } => self.issues_skipped += 1,
            MigrationStatus::DryRun => self.issues_previewed += 1,
            MigrationStatus::Failed { .. } => self.issues_failed += 1,
        }
        self.reports.push(IssueReport::from(outcome));
    }

    /// Records a task that could not be fetched completely.
    pub fn record_fetch_failure(&mut self, monogram: &str, error: &str) {
        self.issues_failed += 1;
        self.reports.push(IssueReport {
            monogram: monogram.to_string(),
            status: MigrationStatus::Failed {
                stage: FailureStage::Fetch,
                error: error.to_string(),
            },
        });
    }

    /// Returns true if any task failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.issues_failed > 0
    }

    /// Returns true if every task was migrated, skipped or previewed.
    #[must_use]
    pub fn all_success(&self) -> bool {
        self.issues_failed == 0
    }
}
