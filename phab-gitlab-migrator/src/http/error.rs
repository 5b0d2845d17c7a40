//! Upstream service error types.

use std::fmt;
use thiserror::Error;

/// The remote service a request was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Phabricator Conduit API (source).
    Phabricator,

    /// GitLab project API (destination).
    GitLab,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Phabricator => f.write_str("Phabricator"),
            Self::GitLab => f.write_str("GitLab"),
        }
    }
}

/// Errors returned by either remote service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request never produced a response.
    #[error("{service} request failed: {source}")]
    Transport {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: Service,
        status: u16,
        body: String,
    },

    /// Conduit reported an error inside a successful HTTP response.
    #[error("Conduit error {code}: {info}")]
    Conduit { code: String, info: String },

    /// The response body did not match the expected shape.
    #[error("Failed to decode {service} response: {source}")]
    Decode {
        service: Service,
        #[source]
        source: serde_json::Error,
    },

    /// A lookup returned an empty result set.
    #[error("{what} not found")]
    NotFound { what: String },

    /// Staging a downloaded file on disk failed.
    #[error("Failed to stage file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl UpstreamError {
    /// Returns true if the error stands for an empty lookup.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
