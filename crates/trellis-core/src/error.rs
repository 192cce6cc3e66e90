//! Unified error types for the Trellis core.
//!
//! Soft misses (unknown modules, malformed filter inputs) never surface as
//! errors. The only failure that crosses a layer boundary is the fatal
//! routing error raised when a routed request has no template to render.

use std::path::PathBuf;

use thiserror::Error;

/// User-facing message shown when routing fails fatally ("Routing error!").
pub const ROUTING_ERROR_MESSAGE: &str = "路由错误！";

// =============================================================================
// Routing Errors
// =============================================================================

/// Errors that terminate a request during routing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The resolved template path does not reference an existing file.
    #[error("template not found for module '{module}': {}", path.display())]
    TemplateNotFound {
        /// The routed module.
        module: String,
        /// The action, empty when none was given.
        action: String,
        /// The path that was checked.
        path: PathBuf,
    },
}

impl RouteError {
    /// Creates a template-not-found error.
    pub fn template_not_found(
        module: impl Into<String>,
        action: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self::TemplateNotFound {
            module: module.into(),
            action: action.into(),
            path: path.into(),
        }
    }

    /// The message shown to the visitor.
    ///
    /// Internal details (paths) stay in the `Display` output for logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::TemplateNotFound { .. } => ROUTING_ERROR_MESSAGE,
        }
    }

    /// HTTP status used when the error halts a response.
    pub fn status(&self) -> u16 {
        match self {
            Self::TemplateNotFound { .. } => 500,
        }
    }
}

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;
