//! File reference tokens.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// `{F123}` with optional embed options such as `{F123, size=full}`.
static FILE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{F(\d+)(?:,[^{}]*)?\}").expect("file reference pattern is valid")
});

/// An inline file embed found in remarkup text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// Numeric Phabricator file id, `None` when it does not fit a `u64`.
    pub id: Option<u64>,

    /// Byte range of the whole token in the scanned text.
    pub span: Range<usize>,
}

/// Returns every file reference in `text`, in text order.
///
/// Ids too large for `u64` cannot name a real file; they are still reported
/// so the token can be replaced.
#[must_use]
pub fn scan_file_refs(text: &str) -> Vec<FileRef> {
    FILE_REF
        .captures_iter(text)
        .filter_map(|captures| {
            let token = captures.get(0)?;
            Some(FileRef {
                id: captures.get(1)?.as_str().parse().ok(),
                span: token.range(),
            })
        })
        .collect()
}
