//! Configuration loading.
//!
//! Settings come from an optional `config.toml` file layered under values
//! given on the command line (or their environment variables):
//!
//! ```toml
//! source-url = "https://phab.example.com/api/"
//! source-token = "api-..."
//! destination-url = "https://gitlab.example.com/api/v4/projects/42"
//! destination-token = "glpat-..."
//! status = "open"
//! output-dir = "dumps"
//! staging-dir = "files"
//! request-timeout-secs = 60
//! dry-run = false
//! keep-going = false
//! ```

mod error;
mod file;
mod migrator;

pub use error::ConfigError;
pub use file::{ConfigFile, DEFAULT_STATUS};
pub use migrator::MigratorConfig;

use std::path::Path;
use tracing::info;

/// Loads the optional config file and layers `overrides` on top of it.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file can't be read or the merged settings
/// are missing or invalid.
pub fn load_config(
    path: Option<&Path>,
    overrides: ConfigFile,
) -> Result<MigratorConfig, ConfigError> {
    let base = match path {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            ConfigFile::load(path)?
        }
        None => ConfigFile::default(),
    };

    base.merge(overrides).into_config()
}
