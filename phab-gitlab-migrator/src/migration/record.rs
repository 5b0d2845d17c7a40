//! Migration records.

use crate::cache::ReferenceCache;
use crate::comments::{assemble_comments, RenderedComment};
use crate::http::UpstreamError;
use crate::phabricator::{Project, SourceTracker, Task, Transaction, User};
use serde::Serialize;
use tracing::debug;

/// Everything fetched and derived for one task before it is migrated.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationRecord {
    /// Source monogram (`T123`).
    pub monogram: String,

    /// The task as returned by `maniphest.search`.
    pub issue: Task,

    /// Full transaction history.
    pub transactions: Vec<Transaction>,

    /// Task author.
    pub author: User,

    /// Comment timeline.
    pub comments: Vec<RenderedComment>,

    /// True unless the task is publicly visible.
    pub confidential: bool,

    /// First tagged project.
    pub project: Option<Project>,
}

/// Fetches the history, author, comments and project of a task.
///
/// # Errors
///
/// Returns [`UpstreamError`] if any of the lookups fails.
pub async fn build_record<S: SourceTracker + ?Sized>(
    source: &S,
    cache: &mut ReferenceCache,
    issue: Task,
) -> Result<MigrationRecord, UpstreamError> {
    let monogram = issue.monogram();

    let transactions = source.search_transactions(&issue.phid).await?;
    let author = cache.user(source, &issue.fields.author_phid).await?;
    let comments = assemble_comments(source, cache, &transactions).await?;

    let project = match issue.project_phid() {
        Some(phid) => Some(cache.project(source, phid).await?),
        None => None,
    };

    debug!(
        issue = %monogram,
        transactions = transactions.len(),
        comments = comments.len(),
        "Built migration record"
    );

    Ok(MigrationRecord {
        monogram,
        confidential: issue.is_confidential(),
        issue,
        transactions,
        author,
        comments,
        project,
    })
}
