//! Comment timeline reconstruction.
//!
//! Turns a task's raw transaction history into the ordered list of comments
//! that is appended to the migrated issue.

mod rendered;

pub use rendered::{render_comments, RenderedComment};

use crate::cache::ReferenceCache;
use crate::http::UpstreamError;
use crate::phabricator::{CommentRevision, SourceTracker, Transaction};

/// Builds the comment timeline of a task.
///
/// Only comment transactions are kept, ordered by ascending transaction id.
/// Each transaction contributes its highest-id revision, unless that revision
/// removed the comment.
///
/// # Errors
///
/// Returns [`UpstreamError`] if a comment author cannot be resolved.
pub async fn assemble_comments<S: SourceTracker + ?Sized>(
    source: &S,
    cache: &mut ReferenceCache,
    transactions: &[Transaction],
) -> Result<Vec<RenderedComment>, UpstreamError> {
    let mut comments = Vec::new();

    for transaction in comment_transactions(transactions) {
        let Some(revision) = latest_revision(transaction) else {
            continue;
        };
        if revision.removed {
            continue;
        }

        let author = cache.user(source, &revision.author_phid).await?;
        comments.push(RenderedComment {
            transaction_id: transaction.id,
            author: author.username().to_string(),
            created: transaction.date_created,
            modified: transaction.date_modified,
            body: revision.content.raw.clone(),
        });
    }

    Ok(comments)
}

/// Returns the comment transactions sorted by ascending id.
fn comment_transactions(transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut comments: Vec<&Transaction> =
        transactions.iter().filter(|t| t.is_comment()).collect();
    comments.sort_by_key(|t| t.id);
    comments
}

/// Returns the authoritative revision of a comment transaction.
fn latest_revision(transaction: &Transaction) -> Option<&CommentRevision> {
    transaction.comments.iter().max_by_key(|revision| revision.id)
}
