//! On-disk dumps of migrated issues.
//!
//! Every processed task leaves a set of files named after its monogram in
//! the output directory:
//!
//! ```text
//! output/
//! ├── T42-issue.json
//! ├── T42-trans.json
//! ├── T42-author.json
//! ├── T42-comments.json
//! ├── T42-project.json
//! └── T42-data.txt
//! ```

mod error;

pub use error::DumpError;

use crate::comments::RenderedComment;
use crate::compose::IssueDraft;
use crate::migration::MigrationRecord;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes the dump files of one task.
///
/// `T<id>-data.txt` holds the composed title on its first line followed by
/// the description, and is only written when a draft exists.
///
/// # Errors
///
/// Returns [`DumpError`] if the directory cannot be created or a file cannot
/// be written.
pub async fn write_issue_dump(
    output_dir: &Path,
    record: &MigrationRecord,
    draft: Option<&IssueDraft>,
) -> Result<Vec<PathBuf>, DumpError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| DumpError::Io {
            path: output_dir.display().to_string(),
            source: e,
        })?;

    let name = &record.monogram;
    let comments: Vec<String> = record.comments.iter().map(RenderedComment::render).collect();

    let mut written = vec![
        write_json(output_dir, name, "issue", &record.issue).await?,
        write_json(output_dir, name, "trans", &record.transactions).await?,
        write_json(output_dir, name, "author", &record.author).await?,
        write_json(output_dir, name, "comments", &comments).await?,
        write_json(output_dir, name, "project", &record.project).await?,
    ];

    if let Some(draft) = draft {
        let path = output_dir.join(format!("{name}-data.txt"));
        let data = format!("{}\n{}", draft.title, draft.description);
        write_file(&path, data.as_bytes()).await?;
        written.push(path);
    }

    debug!(issue = %name, files = written.len(), "Wrote issue dump");
    Ok(written)
}

async fn write_json<T: Serialize + ?Sized>(
    output_dir: &Path,
    name: &str,
    suffix: &str,
    value: &T,
) -> Result<PathBuf, DumpError> {
    let path = output_dir.join(format!("{name}-{suffix}.json"));
    let json = serde_json::to_vec_pretty(value).map_err(|e| DumpError::Json {
        path: path.display().to_string(),
        source: e,
    })?;
    write_file(&path, &json).await?;
    Ok(path)
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), DumpError> {
    tokio::fs::write(path, contents).await.map_err(|e| DumpError::Io {
        path: path.display().to_string(),
        source: e,
    })
}
