//! Config file deserialization.

use super::{ConfigError, MigratorConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Status filter used when none is configured.
pub const DEFAULT_STATUS: &str = "open";

/// Settings as read from a `config.toml` file or the command line.
///
/// Every field is optional so that partial sources can be layered with
/// [`ConfigFile::merge`] before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    /// Conduit API URL (e.g. `https://phab.example.com/api/`).
    pub source_url: Option<String>,

    /// Conduit API token.
    pub source_token: Option<String>,

    /// GitLab project API URL (e.g. `https://gitlab.example.com/api/v4/projects/42`).
    pub destination_url: Option<String>,

    /// GitLab private token.
    pub destination_token: Option<String>,

    /// Maniphest status to migrate (defaults to "open").
    pub status: Option<String>,

    /// Directory receiving issue dumps (defaults to ".").
    pub output_dir: Option<PathBuf>,

    /// Directory downloaded files are staged in (defaults to ".").
    pub staging_dir: Option<PathBuf>,

    /// Per-request timeout in seconds; unset means no timeout.
    pub request_timeout_secs: Option<u64>,

    /// Compose issues without writing to either tracker.
    pub dry_run: Option<bool>,

    /// Record fetch failures per issue instead of aborting the run.
    pub keep_going: Option<bool>,
}

impl ConfigFile {
    /// Loads a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file can't be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading config file");

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Layers `overrides` on top of `self`; values present in `overrides` win.
    #[must_use]
    pub fn merge(self, overrides: ConfigFile) -> Self {
        Self {
            source_url: overrides.source_url.or(self.source_url),
            source_token: overrides.source_token.or(self.source_token),
            destination_url: overrides.destination_url.or(self.destination_url),
            destination_token: overrides.destination_token.or(self.destination_token),
            status: overrides.status.or(self.status),
            output_dir: overrides.output_dir.or(self.output_dir),
            staging_dir: overrides.staging_dir.or(self.staging_dir),
            request_timeout_secs: overrides.request_timeout_secs.or(self.request_timeout_secs),
            dry_run: overrides.dry_run.or(self.dry_run),
            keep_going: overrides.keep_going.or(self.keep_going),
        }
    }

    /// Applies defaults and validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingValue`] if a URL or token is absent and
    /// [`ConfigError::ValidationError`] if a value is unusable.
    pub fn into_config(self) -> Result<MigratorConfig, ConfigError> {
        let source_url = parse_url("source-url", required("source-url", self.source_url)?)?;
        let source_token = non_empty("source-token", required("source-token", self.source_token)?)?;
        let destination_url = parse_url(
            "destination-url",
            required("destination-url", self.destination_url)?,
        )?;
        let destination_token = non_empty(
            "destination-token",
            required("destination-token", self.destination_token)?,
        )?;
        let status = non_empty(
            "status",
            self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        )?;

        let request_timeout = match self.request_timeout_secs {
            Some(0) => {
                return Err(ConfigError::ValidationError {
                    key: "request-timeout-secs".to_string(),
                    message: "must be greater than zero".to_string(),
                })
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Ok(MigratorConfig {
            source_url,
            source_token,
            destination_url,
            destination_token,
            status,
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            staging_dir: self.staging_dir.unwrap_or_else(|| PathBuf::from(".")),
            request_timeout,
            dry_run: self.dry_run.unwrap_or(false),
            keep_going: self.keep_going.unwrap_or(false),
        })
    }
}

fn required(key: &str, value: Option<String>) -> Result<String, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingValue {
        key: key.to_string(),
    })
}

fn non_empty(key: &str, value: String) -> Result<String, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

fn parse_url(key: &str, value: String) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|e| ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("'{value}' is not a valid URL: {e}"),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(url)
}
