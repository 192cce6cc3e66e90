//! Per-request routing.
//!
//! The router runs once per request, after the query variables have been
//! parsed and before the response is rendered:
//!
//! 1. Read `module` / `action` from the query variables.
//! 2. If a module is named, record it in the [`RouteContext`], invoke the
//!    registered callback (if any), turn off canonical redirect and claim
//!    template selection.
//! 3. Run the [`QueryVarsRewriter`], routed or not.
//!
//! A module name with no registration is still recorded: the template
//! resolver decides later whether the request can be served.

use tracing::{debug, trace};

use trellis_core::{QueryVars, Response};

use crate::context::RouteContext;
use crate::registry::ModuleLookup;
use crate::rewrite::{QueryVarsRewriter, RewriteReport};

/// Result of routing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// No module was named. Query variables were still rewritten.
    Unrouted(RewriteReport),
    /// A module was named.
    Routed {
        /// Whether a registered callback ran.
        dispatched: bool,
        /// What the rewriter produced.
        report: RewriteReport,
    },
    /// The module callback halted the response. Nothing after the callback
    /// ran.
    Halted,
}

impl RouteOutcome {
    /// Returns `true` if the callback ended the request.
    pub fn is_halted(&self) -> bool {
        matches!(self, Self::Halted)
    }

    /// The rewrite report, if the rewriter ran.
    pub fn report(&self) -> Option<&RewriteReport> {
        match self {
            Self::Unrouted(report) | Self::Routed { report, .. } => Some(report),
            Self::Halted => None,
        }
    }
}

/// Routes requests against a module registry.
#[derive(Clone, Copy)]
pub struct RequestRouter<'a> {
    modules: &'a dyn ModuleLookup,
    rewriter: &'a QueryVarsRewriter,
}

impl<'a> RequestRouter<'a> {
    /// Creates a router over a module source and rewriter.
    ///
    /// The module source is queried once per request; the entry it returns
    /// is invoked after the lookup completes.
    pub fn new(modules: &'a dyn ModuleLookup, rewriter: &'a QueryVarsRewriter) -> Self {
        Self { modules, rewriter }
    }

    /// Routes one request.
    pub fn route(
        &self,
        ctx: &mut RouteContext,
        vars: &mut QueryVars,
        response: &mut Response,
    ) -> RouteOutcome {
        let Some(module) = vars.non_empty_text("module").map(str::to_string) else {
            trace!("No route module requested");
            return RouteOutcome::Unrouted(self.rewriter.rewrite(vars));
        };
        let action = vars.text("action").unwrap_or_default().to_string();

        ctx.enter(&module, &action);

        let dispatched = match self.modules.lookup_module(&module) {
            Some(entry) => {
                debug!(%module, %action, "Dispatching route module");
                entry.invoke(&action, response);
                true
            }
            None => {
                debug!(%module, "Route module not registered");
                false
            }
        };

        if response.is_halted() {
            debug!(%module, status = response.status(), "Route module halted the request");
            return RouteOutcome::Halted;
        }

        ctx.suppress_canonical_redirect();
        response.set_canonical_redirect(false);
        ctx.claim_template();

        RouteOutcome::Routed {
            dispatched,
            report: self.rewriter.rewrite(vars),
        }
    }
}

impl std::fmt::Debug for RequestRouter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRouter")
            .field("rewriter", self.rewriter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ModuleConfig, ModuleRegistry};
    use std::sync::{Arc, Mutex};
    use trellis_core::StaticTaxonomyCatalog;

    fn rewriter() -> QueryVarsRewriter {
        QueryVarsRewriter::new(Arc::new(StaticTaxonomyCatalog::new().with("color")))
    }

    fn vars(pairs: &[(&str, &str)]) -> QueryVars {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_routed_request_invokes_callback_once() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::new();
        {
            let calls = Arc::clone(&calls);
            registry.register(
                "blog",
                ModuleConfig::new(move |action, module, _response| {
                    calls
                        .lock()
                        .unwrap()
                        .push((action.to_string(), module.to_string()));
                }),
            );
        }
        let rewriter = rewriter();
        let router = RequestRouter::new(&registry, &rewriter);

        let mut ctx = RouteContext::new();
        let mut response = Response::new();
        let outcome = router.route(
            &mut ctx,
            &mut vars(&[("module", "blog"), ("action", "list")]),
            &mut response,
        );

        assert!(matches!(outcome, RouteOutcome::Routed { dispatched: true, .. }));
        assert_eq!(
            *calls.lock().unwrap(),
            vec![("list".to_string(), "blog".to_string())]
        );
        assert!(ctx.is_module(Some("blog"), Some("list")));
        assert!(ctx.is_module(None, None));
        assert!(!ctx.canonical_redirect());
        assert!(!response.canonical_redirect());
        assert!(ctx.has_template_authority());
    }

    #[test]
    fn test_unrouted_request_still_rewrites() {
        let registry = ModuleRegistry::new();
        let rewriter = rewriter();
        let router = RequestRouter::new(&registry, &rewriter);

        let mut ctx = RouteContext::new();
        let mut vars = vars(&[("color_id", "4")]);
        let outcome = router.route(&mut ctx, &mut vars, &mut Response::new());

        let RouteOutcome::Unrouted(report) = outcome else {
            panic!("expected unrouted outcome");
        };
        assert_eq!(report.clauses.len(), 1);
        assert!(vars.tax_query().is_some());
        assert!(!ctx.is_module(None, None));
        assert!(ctx.canonical_redirect());
        assert!(!ctx.has_template_authority());
    }

    #[test]
    fn test_empty_module_is_unrouted() {
        let registry = ModuleRegistry::new();
        let rewriter = rewriter();
        let router = RequestRouter::new(&registry, &rewriter);

        let mut ctx = RouteContext::new();
        let outcome = router.route(
            &mut ctx,
            &mut vars(&[("module", ""), ("action", "list")]),
            &mut Response::new(),
        );

        assert!(matches!(outcome, RouteOutcome::Unrouted(_)));
        assert!(!ctx.is_routed());
    }

    #[test]
    fn test_unknown_module_is_recorded_without_dispatch() {
        let registry = ModuleRegistry::new();
        let rewriter = rewriter();
        let router = RequestRouter::new(&registry, &rewriter);

        let mut ctx = RouteContext::new();
        let outcome = router.route(
            &mut ctx,
            &mut vars(&[("module", "ghost")]),
            &mut Response::new(),
        );

        assert!(matches!(outcome, RouteOutcome::Routed { dispatched: false, .. }));
        assert!(ctx.is_module(Some("ghost"), None));
        assert_eq!(ctx.action(), "");
        assert!(ctx.has_template_authority());
    }

    #[test]
    fn test_halting_callback_stops_processing() {
        let mut registry = ModuleRegistry::new();
        registry.register(
            "feed",
            ModuleConfig::new(|_, _, response| response.halt(200, "<rss/>")),
        );
        let rewriter = rewriter();
        let router = RequestRouter::new(&registry, &rewriter);

        let mut ctx = RouteContext::new();
        let mut vars = vars(&[("module", "feed"), ("color_id", "4")]);
        let mut response = Response::new();
        let outcome = router.route(&mut ctx, &mut vars, &mut response);

        assert!(outcome.is_halted());
        assert!(outcome.report().is_none());
        assert_eq!(response.body(), Some("<rss/>"));
        assert!(!ctx.has_template_authority());
        assert_eq!(vars.text("color_id"), Some("4"));
    }
}
