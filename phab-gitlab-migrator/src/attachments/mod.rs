//! Re-hosting of embedded Phabricator files.
//!
//! Every `{F<id>}` token in a task description or comment is downloaded from
//! Phabricator, uploaded to GitLab and replaced by the markdown GitLab
//! returns. Tokens are found in one scan and replaced in one pass, so
//! replacement text is never inspected again.

mod token;

pub use token::{scan_file_refs, FileRef};

use crate::gitlab::DestinationTracker;
use crate::http::UpstreamError;
use crate::phabricator::{stage_file, SourceTracker};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Text substituted for files that can no longer be downloaded.
pub const DELETED_PLACEHOLDER: &str = "(File deleted)";

/// Errors that abort the relocation of an issue's text.
#[derive(Debug, Error)]
pub enum RelocationError {
    /// GitLab rejected an upload.
    #[error("Failed to upload file F{file_id}: {source}")]
    Upload {
        file_id: u64,
        #[source]
        source: UpstreamError,
    },
}

/// Replacement chosen for one file id.
#[derive(Debug, Clone)]
enum Replacement {
    Uploaded(String),
    Deleted,
}

impl Replacement {
    fn as_str(&self) -> &str {
        match self {
            Self::Uploaded(markdown) => markdown,
            Self::Deleted => DELETED_PLACEHOLDER,
        }
    }
}

/// Relocates the files referenced by one issue.
///
/// Each file id is transferred at most once per relocator, so a file embedded
/// in both the description and a comment is uploaded a single time.
pub struct Relocator<'a, S: ?Sized, D: ?Sized> {
    source: &'a S,
    destination: &'a D,
    staging_dir: &'a Path,
    resolved: HashMap<u64, Replacement>,
}

impl<'a, S, D> Relocator<'a, S, D>
where
    S: SourceTracker + ?Sized,
    D: DestinationTracker + ?Sized,
{
    /// Creates a relocator staging downloads under `staging_dir`.
    pub fn new(source: &'a S, destination: &'a D, staging_dir: &'a Path) -> Self {
        Self {
            source,
            destination,
            staging_dir,
            resolved: HashMap::new(),
        }
    }

    /// Rewrites every file reference in `text`.
    ///
    /// Files that cannot be downloaded are replaced by
    /// [`DELETED_PLACEHOLDER`] at every occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`RelocationError::Upload`] as soon as an upload fails; no
    /// partially rewritten text is returned.
    pub async fn relocate(&mut self, text: &str) -> Result<String, RelocationError> {
        let refs = scan_file_refs(text);
        if refs.is_empty() {
            return Ok(text.to_string());
        }

        let mut output = String::with_capacity(text.len());
        let mut cursor = 0;

        for file_ref in &refs {
            output.push_str(&text[cursor..file_ref.span.start]);
            let replacement = match file_ref.id {
                Some(id) => self.resolve(id).await?,
                None => {
                    warn!(token = &text[file_ref.span.clone()], "File id out of range");
                    Replacement::Deleted
                }
            };
            output.push_str(replacement.as_str());
            cursor = file_ref.span.end;
        }

        output.push_str(&text[cursor..]);
        Ok(output)
    }

    /// Number of files that were uploaded so far.
    #[must_use]
    pub fn uploaded_count(&self) -> usize {
        self.resolved
            .values()
            .filter(|replacement| matches!(replacement, Replacement::Uploaded(_)))
            .count()
    }

    async fn resolve(&mut self, id: u64) -> Result<Replacement, RelocationError> {
        if let Some(replacement) = self.resolved.get(&id) {
            return Ok(replacement.clone());
        }

        let replacement = self.transfer(id).await?;
        self.resolved.insert(id, replacement.clone());
        Ok(replacement)
    }

    async fn transfer(&self, id: u64) -> Result<Replacement, RelocationError> {
        let staged = match stage_file(self.source, self.staging_dir, id).await {
            Ok(Some(staged)) => staged,
            Ok(None) => {
                warn!(file_id = id, "File not found");
                return Ok(Replacement::Deleted);
            }
            Err(e) => {
                warn!(file_id = id, error = %e, "Failed to download file");
                return Ok(Replacement::Deleted);
            }
        };

        let content = match tokio::fs::read(&staged.path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(file_id = id, path = %staged.path.display(), error = %e, "Failed to read staged file");
                return Ok(Replacement::Deleted);
            }
        };

        let uploaded = self
            .destination
            .upload_file(&staged.original_name, content)
            .await
            .map_err(|source| RelocationError::Upload {
                file_id: id,
                source,
            })?;

        debug!(file_id = id, markdown = %uploaded.markdown, "Relocated file");
        Ok(Replacement::Uploaded(uploaded.markdown))
    }
}
