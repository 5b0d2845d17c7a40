//! Rendered comment blocks.

use chrono::DateTime;
use serde::Serialize;

/// Timestamp layout used in comment headers.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A comment reconstructed from its latest revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedComment {
    /// Source transaction id.
    pub transaction_id: u64,

    /// Author username.
    pub author: String,

    /// Transaction creation time, unix seconds.
    pub created: i64,

    /// Transaction modification time, unix seconds.
    pub modified: i64,

    /// Raw comment body.
    pub body: String,
}

impl RenderedComment {
    /// Returns true when the comment was changed after it was posted.
    #[must_use]
    pub fn is_edited(&self) -> bool {
        self.created != self.modified
    }

    /// Returns the modification time as `YYYY-MM-DD HH:MM:SS` in UTC.
    #[must_use]
    pub fn timestamp(&self) -> String {
        format_utc(self.modified)
    }

    /// Renders the comment as a markdown block ending in a separator.
    #[must_use]
    pub fn render(&self) -> String {
        let edited = if self.is_edited() { " (Edited)" } else { "" };
        format!(
            "**{} commented on {} UTC{}:**\n\n{}\n\n----\n\n\n",
            self.author,
            self.timestamp(),
            edited,
            self.body
        )
    }
}

/// Concatenates rendered comment blocks in order.
#[must_use]
pub fn render_comments(comments: &[RenderedComment]) -> String {
    comments.iter().map(RenderedComment::render).collect()
}

/// Formats unix seconds as UTC; out-of-range values fall back to the number.
pub(crate) fn format_utc(seconds: i64) -> String {
    DateTime::from_timestamp(seconds, 0)
        .map(|time| time.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| seconds.to_string())
}
