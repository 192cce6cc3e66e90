//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while building or running a site.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Routing failed fatally.
    #[error(transparent)]
    Route(#[from] trellis_core::RouteError),

    /// A rewrite rule pattern does not compile.
    #[error("Invalid rewrite rule '{pattern}': {source}")]
    InvalidRewriteRule {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
