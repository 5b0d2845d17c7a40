//! Phabricator source access.
//!
//! This module fetches Maniphest tasks, their transaction history, the users
//! and projects they reference and their embedded files, and posts the
//! forwarding comment back once a task has been migrated.

mod client;
mod files;
mod form;
mod models;

pub use client::PhabricatorClient;
pub use files::{stage_file, StagedFile};
pub use form::ConduitParams;
pub use models::{
    CommentRevision, ConduitResponse, Cursor, CursorToken, EditResult, FileFields, FileInfo,
    Policy, Project, ProjectFields, ProjectsAttachment, RawText, SearchPage, Task,
    TaskAttachments, TaskFields, Transaction, User, UserFields, COMMENT_TRANSACTION,
    PUBLIC_POLICY,
};

use crate::http::UpstreamError;
use async_trait::async_trait;

/// Read and write-back operations against the source tracker.
///
/// [`PhabricatorClient`] talks to Conduit; tests substitute in-memory fakes.
#[async_trait]
pub trait SourceTracker: Send + Sync {
    /// Returns every task with the given status, following all pages.
    async fn search_issues(&self, status: &str) -> Result<Vec<Task>, UpstreamError>;

    /// Returns the full transaction history of a task, following all pages.
    async fn search_transactions(&self, issue_phid: &str)
        -> Result<Vec<Transaction>, UpstreamError>;

    /// Looks up a single user.
    ///
    /// Returns [`UpstreamError::NotFound`] when no user has this PHID.
    async fn user(&self, phid: &str) -> Result<User, UpstreamError>;

    /// Looks up a single project.
    ///
    /// Returns [`UpstreamError::NotFound`] when no project has this PHID.
    async fn project(&self, phid: &str) -> Result<Project, UpstreamError>;

    /// Looks up file metadata by numeric id, `None` when the file is gone.
    async fn file_info(&self, id: u64) -> Result<Option<FileInfo>, UpstreamError>;

    /// Downloads file content from its data URI.
    async fn file_content(&self, uri: &str) -> Result<Vec<u8>, UpstreamError>;

    /// Adds a comment to a task.
    async fn post_comment(&self, issue_phid: &str, text: &str) -> Result<(), UpstreamError>;
}

/// Builds the forwarding comment left on a migrated task.
#[must_use]
pub fn moved_comment(destination_url: &str) -> String {
    format!("This issue was moved to gitlab: {destination_url}")
}
