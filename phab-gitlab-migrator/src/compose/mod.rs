//! Composition of the GitLab issue payload.
//!
//! This module builds the title, the description (via Handlebars) and the
//! confidentiality flag of a migrated issue, and reconstructs the browser
//! URL of the original task.

mod error;
mod renderer;

pub use error::ComposeError;
pub use renderer::{DescriptionContext, DescriptionRenderer};

use serde::Serialize;
use url::Url;

/// Payload sent to GitLab for one migrated task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueDraft {
    /// `"T<id>: <original title>"`.
    pub title: String,

    /// Rendered markdown description.
    pub description: String,

    /// Whether the issue is hidden from non-members.
    pub confidential: bool,
}

/// Builds the migrated issue title.
///
/// Format: "{monogram}: {title}"
#[must_use]
pub fn issue_title(monogram: &str, title: &str) -> String {
    format!("{monogram}: {title}")
}

/// Reconstructs the browser URL of a task from the Conduit API URL.
///
/// Scheme, host and port are kept; the path becomes the monogram and query,
/// fragment and credentials are dropped.
#[must_use]
pub fn source_issue_url(api_url: &Url, monogram: &str) -> String {
    format!("{}/{}", api_url.origin().ascii_serialization(), monogram)
}

/// Assembles the issue payload.
///
/// # Errors
///
/// Returns [`ComposeError`] if the description cannot be rendered.
pub fn compose_issue(
    renderer: &DescriptionRenderer,
    title: String,
    context: &DescriptionContext<'_>,
    confidential: bool,
) -> Result<IssueDraft, ComposeError> {
    Ok(IssueDraft {
        title,
        description: renderer.render(context)?,
        confidential,
    })
}
