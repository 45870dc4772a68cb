//! Error types for the module system.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while loading or interpreting a module configuration file.
///
/// Config failures are never fatal to server startup: the registry logs them
/// and the owning module keeps whatever defaults its fields already hold.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
}
