//! # Trellis Framework
//!
//! The routing core of Trellis.
//!
//! This layer provides:
//! - [`ModuleRegistry`]: named route modules with typed callbacks and
//!   registration filters
//! - [`RequestRouter`]: per-request classification into module/action,
//!   callback dispatch and canonical-redirect suppression
//! - [`QueryVarsRewriter`]: translation of URL scalars (`tag_id`, `cat`,
//!   `{taxonomy}_id`, `term_id`, `cursor`, `since`) into structured
//!   taxonomy and date clauses
//! - [`TemplateResolver`]: template selection for routed requests
//!
//! All per-request state lives in a [`RouteContext`] that the caller threads
//! from routing to template resolution.
//!
//! ```rust,ignore
//! use trellis_framework::{ModuleConfig, ModuleRegistry, QueryVarsRewriter, RequestRouter, RouteContext};
//!
//! let mut registry = ModuleRegistry::new();
//! registry.register("blog", ModuleConfig::new(|action, module, _response| {
//!     tracing::info!(module, action, "blog module");
//! }));
//!
//! let router = RequestRouter::new(&registry, &rewriter);
//! let mut ctx = RouteContext::new();
//! router.route(&mut ctx, &mut vars, &mut response);
//! assert!(ctx.is_module(Some("blog"), None));
//! ```

pub mod context;
pub mod registry;
pub mod rewrite;
pub mod router;
pub mod template;

pub use context::{RouteContext, RouteState};
pub use registry::{
    ModuleCallback, ModuleConfig, ModuleEntry, ModuleLookup, ModuleRegistry, RegistrationFilter,
};
pub use rewrite::{QueryVarsRewriter, RewriteReport, TaxQueryMerge, offset_from_hours};
pub use router::{RequestRouter, RouteOutcome};
pub use template::{DEFAULT_TEMPLATE_SUFFIX, TemplateFilter, TemplateResolver};
