//! GitLab API records.

use serde::{Deserialize, Serialize};

/// Response of `POST /projects/:id/uploads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Alt text GitLab derived from the file name.
    #[serde(default)]
    pub alt: String,

    /// Project-relative storage location.
    pub url: String,

    /// Path including the project namespace.
    #[serde(default)]
    pub full_path: Option<String>,

    /// Ready-to-embed markdown (`![alt](/uploads/...)` or `[alt](...)`).
    pub markdown: String,
}

/// Minimal view of a GitLab issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    /// Project-scoped issue number.
    pub iid: u64,

    /// Issue title.
    #[serde(default)]
    pub title: String,

    /// Canonical browser URL.
    pub web_url: String,
}

/// Body of `POST /projects/:id/issues`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct NewIssueRequest<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub confidential: bool,
}
