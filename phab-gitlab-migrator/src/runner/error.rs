//! Runner error types.

use crate::http::UpstreamError;

/// Errors that abort a migration run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// HTTP client initialization errors.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// A source lookup that the run cannot do without failed.
    #[error("Failed to fetch {context}: {source}")]
    Upstream {
        /// What was being fetched (`issue list`, `T42`).
        context: String,
        #[source]
        source: UpstreamError,
    },

    /// Writing an issue dump failed.
    #[error(transparent)]
    Dump(#[from] crate::dump::DumpError),

    /// The description template could not be registered.
    #[error(transparent)]
    Compose(#[from] crate::compose::ComposeError),
}
