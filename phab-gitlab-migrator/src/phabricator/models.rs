//! Conduit response records.
//!
//! Field names follow the Conduit wire format; anything the migrator does
//! not read itself is kept in the `extra` maps so dumps stay complete.

use crate::http::UpstreamError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// View policy value that makes a task visible to everyone.
pub const PUBLIC_POLICY: &str = "public";

/// Envelope wrapping every Conduit response.
#[derive(Debug, Clone, Deserialize)]
pub struct ConduitResponse<T> {
    /// Method result, absent when the call failed.
    pub result: Option<T>,

    /// Conduit error code (e.g. `ERR-INVALID-AUTH`).
    pub error_code: Option<String>,

    /// Human readable error description.
    pub error_info: Option<String>,
}

impl<T> ConduitResponse<T> {
    /// Converts the envelope into the method result.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Conduit`] when an error code is set or the
    /// result is missing.
    pub fn into_result(self) -> Result<T, UpstreamError> {
        if let Some(code) = self.error_code {
            return Err(UpstreamError::Conduit {
                code,
                info: self.error_info.unwrap_or_default(),
            });
        }
        self.result.ok_or_else(|| UpstreamError::Conduit {
            code: "ERR-EMPTY-RESULT".to_string(),
            info: "response carried neither a result nor an error".to_string(),
        })
    }
}

/// One page of a `*.search` method.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage<T> {
    /// Records on this page.
    pub data: Vec<T>,

    /// Paging cursor.
    #[serde(default)]
    pub cursor: Cursor,
}

/// Conduit paging cursor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cursor {
    /// Continuation token for the next page, `None` on the last page.
    #[serde(default)]
    pub after: Option<CursorToken>,
}

/// Cursor values are strings on most installs but plain numbers on some.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CursorToken {
    Text(String),
    Number(u64),
}

impl std::fmt::Display for CursorToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

/// Raw remarkup text as stored by Phabricator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawText {
    /// Unrendered remarkup source.
    #[serde(default)]
    pub raw: String,
}

/// A Maniphest task returned by `maniphest.search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Numeric task id (`T<id>` in the UI).
    pub id: u64,

    /// Task PHID.
    pub phid: String,

    /// Task fields.
    pub fields: TaskFields,

    /// Requested attachments.
    #[serde(default)]
    pub attachments: TaskAttachments,
}

impl Task {
    /// Returns the monogram used as the stable source identifier (`T123`).
    #[must_use]
    pub fn monogram(&self) -> String {
        format!("T{}", self.id)
    }

    /// Returns the first attached project PHID, if any.
    #[must_use]
    pub fn project_phid(&self) -> Option<&str> {
        self.attachments
            .projects
            .as_ref()
            .and_then(|projects| projects.project_phids.first())
            .map(String::as_str)
    }

    /// Returns true unless the view policy is `public`.
    #[must_use]
    pub fn is_confidential(&self) -> bool {
        self.fields.policy.view != PUBLIC_POLICY
    }
}

/// Fields of a Maniphest task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskFields {
    /// Task title.
    pub name: String,

    /// Task description.
    #[serde(default)]
    pub description: RawText,

    /// Author PHID.
    #[serde(rename = "authorPHID")]
    pub author_phid: String,

    /// Object policies.
    pub policy: Policy,

    /// Fields the migrator does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Object policies of a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// View policy: `public`, `users`, a PHID, ...
    pub view: String,

    /// Edit policy.
    #[serde(default)]
    pub edit: Option<String>,
}

/// Attachments requested on `maniphest.search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskAttachments {
    /// Project attachment, present when `attachments[projects]` was set.
    #[serde(default)]
    pub projects: Option<ProjectsAttachment>,
}

/// Project PHIDs attached to a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectsAttachment {
    /// Tagged project PHIDs.
    #[serde(rename = "projectPHIDs", default)]
    pub project_phids: Vec<String>,
}

/// Transaction type carrying a comment.
pub const COMMENT_TRANSACTION: &str = "comment";

/// An event in a task's history, returned by `transaction.search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Monotonic transaction id.
    pub id: u64,

    /// Transaction PHID.
    pub phid: String,

    /// Transaction type; `null` for types Conduit does not expose.
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Acting user PHID.
    #[serde(rename = "authorPHID", default)]
    pub author_phid: Option<String>,

    /// Creation time, unix seconds.
    #[serde(rename = "dateCreated")]
    pub date_created: i64,

    /// Last modification time, unix seconds.
    #[serde(rename = "dateModified")]
    pub date_modified: i64,

    /// Comment revisions, empty for non-comment transactions.
    #[serde(default)]
    pub comments: Vec<CommentRevision>,

    /// Fields the migrator does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    /// Returns true for comment transactions.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.kind.as_deref() == Some(COMMENT_TRANSACTION)
    }
}

/// One revision of a comment transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRevision {
    /// Revision id; the highest id is the current text.
    pub id: u64,

    /// Revision PHID.
    pub phid: String,

    /// Comment author PHID.
    #[serde(rename = "authorPHID")]
    pub author_phid: String,

    /// Whether this revision removed the comment.
    #[serde(default)]
    pub removed: bool,

    /// Comment text.
    #[serde(default)]
    pub content: RawText,
}

/// A user returned by `user.search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Numeric user id.
    pub id: u64,

    /// User PHID.
    pub phid: String,

    /// User fields.
    pub fields: UserFields,
}

impl User {
    /// Returns the name shown in migrated content.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.fields.username
    }
}

/// Fields of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFields {
    /// Login name.
    pub username: String,

    /// Display name.
    #[serde(rename = "realName", default)]
    pub real_name: String,
}

/// A project returned by `project.search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Numeric project id.
    pub id: u64,

    /// Project PHID.
    pub phid: String,

    /// Project fields.
    pub fields: ProjectFields,
}

/// Fields of a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFields {
    /// Project name.
    pub name: String,

    /// Hashtag slug.
    #[serde(default)]
    pub slug: Option<String>,
}

/// A file returned by `file.search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    /// Numeric file id (`F<id>`).
    pub id: u64,

    /// File PHID.
    pub phid: String,

    /// File fields.
    pub fields: FileFields,
}

/// Fields of a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFields {
    /// Original upload name.
    pub name: String,

    /// Direct download URI.
    #[serde(rename = "dataURI")]
    pub data_uri: String,

    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
}

/// Result of `maniphest.edit`.
#[derive(Debug, Clone, Deserialize)]
pub struct EditResult {
    /// Edited object.
    #[serde(default)]
    pub object: Option<Value>,
}
