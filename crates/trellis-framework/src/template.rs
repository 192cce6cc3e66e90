//! Template selection for routed requests.
//!
//! A routed request renders `<theme_root>/template/<module>/<action>.<suffix>`,
//! with `index` standing in for an empty action. Filters may rewrite the
//! candidate path before the file check. A missing file is fatal for the
//! request, and so is a module or action that would leave the template
//! directory (`..`, absolute paths).

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error};

use trellis_core::{RouteError, RouteResult};

use crate::context::RouteContext;

/// Suffix of template files when none is configured.
pub const DEFAULT_TEMPLATE_SUFFIX: &str = "php";

const TEMPLATE_DIR: &str = "template";
const INDEX_TEMPLATE: &str = "index";

/// A template filter, invoked with `(candidate, module, action)`.
pub type TemplateFilter = Arc<dyn Fn(PathBuf, &str, &str) -> PathBuf + Send + Sync>;

/// Resolves the template of a routed request.
#[derive(Clone)]
pub struct TemplateResolver {
    theme_root: PathBuf,
    suffix: String,
    filters: Vec<TemplateFilter>,
}

impl TemplateResolver {
    /// Creates a resolver rooted at the active theme directory.
    pub fn new(theme_root: impl Into<PathBuf>) -> Self {
        Self {
            theme_root: theme_root.into(),
            suffix: DEFAULT_TEMPLATE_SUFFIX.to_string(),
            filters: Vec::new(),
        }
    }

    /// Sets the template file suffix (without the dot).
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Adds a filter over candidate paths. Filters run in insertion order.
    pub fn add_filter<F>(&mut self, filter: F)
    where
        F: Fn(PathBuf, &str, &str) -> PathBuf + Send + Sync + 'static,
    {
        self.filters.push(Arc::new(filter));
    }

    /// The theme directory.
    pub fn theme_root(&self) -> &Path {
        &self.theme_root
    }

    /// The unfiltered candidate path for a module/action.
    pub fn candidate(&self, module: &str, action: &str) -> PathBuf {
        let stem = if action.is_empty() || action == "0" {
            INDEX_TEMPLATE
        } else {
            action
        };
        self.theme_root
            .join(TEMPLATE_DIR)
            .join(module)
            .join(format!("{stem}.{}", self.suffix))
    }

    /// Resolves the template for a request.
    ///
    /// Returns `Ok(None)` when the router did not claim template selection,
    /// leaving the host's own template in place.
    ///
    /// # Errors
    ///
    /// [`RouteError::TemplateNotFound`] when the final path is not a file.
    pub fn resolve(&self, ctx: &RouteContext) -> RouteResult<Option<PathBuf>> {
        if !ctx.has_template_authority() {
            return Ok(None);
        }

        let (module, action) = (ctx.module(), ctx.action());
        let candidate = self.candidate(module, action);
        if !is_relative_segment(module) || !is_relative_segment(action) {
            error!(%module, %action, "Route template escapes the template directory");
            return Err(RouteError::template_not_found(module, action, candidate));
        }

        let path = self
            .filters
            .iter()
            .fold(candidate, |path, filter| filter(path, module, action));

        if !path.is_file() {
            error!(%module, %action, path = %path.display(), "Route template not found");
            return Err(RouteError::template_not_found(module, action, path));
        }

        debug!(%module, %action, path = %path.display(), "Resolved route template");
        Ok(Some(path))
    }
}

/// Returns `true` if `segment` only names entries below the directory it is
/// joined to.
fn is_relative_segment(segment: &str) -> bool {
    Path::new(segment)
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

impl fmt::Debug for TemplateResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateResolver")
            .field("theme_root", &self.theme_root)
            .field("suffix", &self.suffix)
            .field("filters", &self.filters.len())
            .finish()
    }
}
