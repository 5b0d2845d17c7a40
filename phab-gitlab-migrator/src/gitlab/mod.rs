//! GitLab destination access.
//!
//! This module re-hosts files through the project uploads endpoint, creates
//! the migrated issues and looks up issues that were already migrated.

mod client;
mod models;

pub use client::GitLabClient;
pub use models::{CreatedIssue, UploadedFile};

use crate::compose::IssueDraft;
use crate::http::UpstreamError;
use async_trait::async_trait;

/// Operations against the destination tracker.
#[async_trait]
pub trait DestinationTracker: Send + Sync {
    /// Uploads a file and returns its embed markup.
    async fn upload_file(
        &self,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<UploadedFile, UpstreamError>;

    /// Creates an issue from a composed draft.
    async fn create_issue(&self, draft: &IssueDraft) -> Result<CreatedIssue, UpstreamError>;

    /// Returns an open issue whose title matches exactly, if any.
    async fn find_open_issue(&self, title: &str) -> Result<Option<CreatedIssue>, UpstreamError>;
}
