//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse config file '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A value is present but unusable.
    #[error("Invalid value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    /// A required value was given neither in the file nor on the command line.
    #[error("Missing required value '{key}'")]
    MissingValue { key: String },
}
