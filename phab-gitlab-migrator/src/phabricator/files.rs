//! Local staging of Phabricator files.

use super::SourceTracker;
use crate::http::UpstreamError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix of a download that has not been moved into place yet.
const PARTIAL_SUFFIX: &str = ".part";

/// A Phabricator file materialised on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Numeric file id.
    pub id: u64,

    /// Name the file was originally uploaded with.
    pub original_name: String,

    /// Location on disk: `<staging>/F<id>/<original_name>`.
    pub path: PathBuf,
}

/// Downloads file `F<id>` into `<staging_dir>/F<id>/<original-name>`.
///
/// A file already present at that path is reused without downloading it
/// again. Content is written to `<original-name>.part` first and renamed
/// once complete, so an interrupted download is never reused. Failing to create the directory is only logged; the subsequent
/// write reports the real error.
///
/// # Returns
///
/// `Ok(None)` when Phabricator no longer knows the file.
///
/// # Errors
///
/// Returns [`UpstreamError`] if the lookup or download fails, or if the
/// content cannot be written.
pub async fn stage_file<S: SourceTracker + ?Sized>(
    source: &S,
    staging_dir: &Path,
    id: u64,
) -> Result<Option<StagedFile>, UpstreamError> {
    let directory = staging_dir.join(format!("F{id}"));
    if let Err(e) = tokio::fs::create_dir_all(&directory).await {
        warn!(path = %directory.display(), error = %e, "Failed to create directory");
    }

    let Some(info) = source.file_info(id).await? else {
        return Ok(None);
    };

    let original_name = sanitize_file_name(&info.fields.name, id);
    let path = directory.join(&original_name);

    if tokio::fs::try_exists(&path).await.unwrap_or(false) {
        debug!(file_id = id, path = %path.display(), "Reusing staged file");
    } else {
        let content = source.file_content(&info.fields.data_uri).await?;
        let partial = directory.join(format!("{original_name}{PARTIAL_SUFFIX}"));
        tokio::fs::write(&partial, &content)
            .await
            .map_err(|source| UpstreamError::Io {
                path: partial.display().to_string(),
                source,
            })?;
        tokio::fs::rename(&partial, &path)
            .await
            .map_err(|source| UpstreamError::Io {
                path: path.display().to_string(),
                source,
            })?;
        debug!(file_id = id, bytes = content.len(), "Downloaded file");
    }

    Ok(Some(StagedFile {
        id,
        original_name,
        path,
    }))
}

/// Keeps the staged file inside its `F<id>` directory.
fn sanitize_file_name(name: &str, id: u64) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty() || base == "." || base == ".." {
        format!("F{id}")
    } else {
        base.to_string()
    }
}
