//! Per-request routing context.
//!
//! One [`RouteContext`] is created per request. The router writes the
//! module/action into it, and the template resolver and any other
//! collaborator asking "is this request served by module X" read from it
//! later. Nothing here is shared between requests.

/// Module and action captured from a routed request.
///
/// An empty `module` means no module matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteState {
    module: String,
    action: String,
}

impl RouteState {
    /// The routed module, empty when unrouted.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The routed action, possibly empty.
    pub fn action(&self) -> &str {
        &self.action
    }
}

/// State threaded from routing to template resolution for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteContext {
    state: RouteState,
    canonical_redirect: bool,
    template_authority: bool,
}

impl Default for RouteContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteContext {
    /// Creates an unrouted context.
    pub fn new() -> Self {
        Self {
            state: RouteState::default(),
            canonical_redirect: true,
            template_authority: false,
        }
    }

    /// The captured module/action.
    pub fn state(&self) -> &RouteState {
        &self.state
    }

    /// The routed module, empty when unrouted.
    pub fn module(&self) -> &str {
        &self.state.module
    }

    /// The routed action, possibly empty.
    pub fn action(&self) -> &str {
        &self.state.action
    }

    /// Returns `true` once a module has been captured.
    pub fn is_routed(&self) -> bool {
        !self.state.module.is_empty()
    }

    /// Asks whether this request is served by a module (and action).
    ///
    /// - module and action given: both must match
    /// - only module given: the module must match
    /// - otherwise: any module must be routed
    ///
    /// Empty strings count as not given, so an action alone asks the same
    /// question as no arguments.
    pub fn is_module(&self, module: Option<&str>, action: Option<&str>) -> bool {
        let module = module.filter(|m| !m.is_empty());
        let action = action.filter(|a| !a.is_empty());

        match (module, action) {
            (Some(module), Some(action)) => {
                module == self.state.module && action == self.state.action
            }
            (Some(module), None) => module == self.state.module,
            (None, _) => self.is_routed(),
        }
    }

    /// Whether the host's canonical-URL redirect should still run.
    pub fn canonical_redirect(&self) -> bool {
        self.canonical_redirect
    }

    /// Whether template selection has been claimed by the router.
    pub fn has_template_authority(&self) -> bool {
        self.template_authority
    }

    pub(crate) fn enter(&mut self, module: &str, action: &str) {
        self.state = RouteState {
            module: module.to_string(),
            action: action.to_string(),
        };
    }

    pub(crate) fn suppress_canonical_redirect(&mut self) {
        self.canonical_redirect = false;
    }

    pub(crate) fn claim_template(&mut self) {
        self.template_authority = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routed(module: &str, action: &str) -> RouteContext {
        let mut ctx = RouteContext::new();
        ctx.enter(module, action);
        ctx
    }

    #[test]
    fn test_unrouted_context() {
        let ctx = RouteContext::new();

        assert!(!ctx.is_routed());
        assert!(!ctx.is_module(None, None));
        assert!(!ctx.is_module(Some("blog"), None));
        assert!(ctx.canonical_redirect());
        assert!(!ctx.has_template_authority());
    }

    #[test]
    fn test_is_module_queries() {
        let ctx = routed("blog", "list");

        assert!(ctx.is_module(None, None));
        assert!(ctx.is_module(Some("blog"), None));
        assert!(ctx.is_module(Some("blog"), Some("list")));
        assert!(!ctx.is_module(Some("blog"), Some("other")));
        assert!(!ctx.is_module(Some("shop"), None));
    }

    #[test]
    fn test_action_alone_means_any_module() {
        assert!(routed("blog", "list").is_module(None, Some("other")));
        assert!(!RouteContext::new().is_module(None, Some("list")));
        assert!(routed("blog", "list").is_module(Some(""), Some("nope")));
    }

    #[test]
    fn test_module_without_action() {
        let ctx = routed("blog", "");

        assert!(ctx.is_module(Some("blog"), None));
        assert!(!ctx.is_module(Some("blog"), Some("list")));
    }
}
