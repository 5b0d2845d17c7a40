//! Per-issue report lines.

use crate::migration::{MigrationOutcome, MigrationStatus};
use serde::Serialize;

/// Final state of one task, as kept in the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueReport {
    /// Source monogram (`T123`).
    pub monogram: String,

    /// Final state.
    #[serde(flatten)]
    pub status: MigrationStatus,
}

impl From<&MigrationOutcome> for IssueReport {
    fn from(outcome: &MigrationOutcome) -> Self {
        Self {
            monogram: outcome.monogram.clone(),
            status: outcome.status.clone(),
        }
    }
}
