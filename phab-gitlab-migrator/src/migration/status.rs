//! Per-issue migration states and outcomes.

use crate::compose::IssueDraft;
use serde::Serialize;
use std::fmt;

/// Progress of a single issue through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStage {
    Fetched,
    CommentsAssembled,
    DescriptionRelocated,
    CommentsRelocated,
    Composed,
    Created,
    WritebackAttempted,
    Done,
}

/// Stage at which an issue's migration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Fetching transactions, authors or the project failed.
    Fetch,

    /// Looking for an already migrated issue failed.
    DuplicateCheck,

    /// Uploading an attachment failed.
    Upload,

    /// Rendering the description failed.
    Compose,

    /// GitLab rejected the new issue.
    Create,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::DuplicateCheck => "duplicate check",
            Self::Upload => "upload",
            Self::Compose => "compose",
            Self::Create => "create",
        };
        f.write_str(name)
    }
}

/// Result of posting the forwarding comment on the source task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WritebackStatus {
    /// The comment was posted.
    Posted,

    /// Posting failed; the migration still stands.
    Failed {
        /// Error message.
        error: String,
    },
}

/// Final state of one issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MigrationStatus {
    /// The GitLab issue was created.
    Created {
        /// GitLab issue URL.
        url: String,
        /// Forwarding comment result.
        writeback: WritebackStatus,
    },

    /// An issue with the same title already exists.
    Skipped {
        /// Reason for skipping.
        reason: String,
        /// URL of the existing issue.
        url: String,
    },

    /// The issue was composed but nothing was written.
    DryRun,

    /// The migration stopped before the issue was created.
    Failed {
        /// Stage that failed.
        stage: FailureStage,
        /// Error message.
        error: String,
    },
}

impl MigrationStatus {
    /// Returns the GitLab URL for created or skipped issues.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Created { url, .. } | Self::Skipped { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// What happened to one issue, together with the payload that was composed.
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    /// Source monogram (`T123`).
    pub monogram: String,

    /// Composed payload, absent when the pipeline stopped before composing.
    pub draft: Option<IssueDraft>,

    /// Final state.
    pub status: MigrationStatus,
}
