//! Dump error types.

use thiserror::Error;

/// Errors that can occur while writing issue dumps.
#[derive(Debug, Error)]
pub enum DumpError {
    /// Failed to create the directory or write a file.
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize a record.
    #[error("Failed to serialize '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
