//! Validated migrator configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Configuration for a migration run.
///
/// Built from a [`ConfigFile`](super::ConfigFile) via
/// [`ConfigFile::into_config`](super::ConfigFile::into_config).
#[derive(Debug, Clone)]
pub struct MigratorConfig {
    pub(super) source_url: Url,
    pub(super) source_token: String,
    pub(super) destination_url: Url,
    pub(super) destination_token: String,
    pub(super) status: String,
    pub(super) output_dir: PathBuf,
    pub(super) staging_dir: PathBuf,
    pub(super) request_timeout: Option<Duration>,
    pub(super) dry_run: bool,
    pub(super) keep_going: bool,
}

impl MigratorConfig {
    /// Returns the Conduit API URL.
    pub fn source_url(&self) -> &Url {
        &self.source_url
    }

    /// Returns the Conduit API token.
    pub fn source_token(&self) -> &str {
        &self.source_token
    }

    /// Returns the GitLab project API URL.
    pub fn destination_url(&self) -> &Url {
        &self.destination_url
    }

    /// Returns the GitLab private token.
    pub fn destination_token(&self) -> &str {
        &self.destination_token
    }

    /// Returns the Maniphest status filter.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns the dump directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the staging directory.
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Returns the per-request timeout, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns whether per-issue fetch failures are tolerated.
    pub fn keep_going(&self) -> bool {
        self.keep_going
    }

    /// Sets the dump and staging directories.
    #[must_use]
    pub fn with_directories(mut self, output_dir: PathBuf, staging_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self.staging_dir = staging_dir;
        self
    }
}
