//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Why a site configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The file extension names no enabled format.
    #[error("Unsupported configuration format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// The merged sources do not deserialize into [`TrellisConfig`](super::TrellisConfig).
    #[error("Failed to extract configuration: {0}")]
    Extract(#[from] figment::Error),

    /// A setting is out of range or empty.
    #[error("Invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    /// Rejects the value of `field`.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
