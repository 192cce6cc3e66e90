//! # Trellis
//!
//! Module routing and query rewriting for content-managed sites.
//!
//! ## Overview
//!
//! A feature registers a named *route module* at startup. Requests carrying
//! `module=<name>` (directly or through a pretty URL such as
//! `api/post.json`) are dispatched to that module's callback, canonical
//! redirects are turned off, and the page is rendered from
//! `template/<module>/<action>.php` in the active theme.
//!
//! Every request, routed or not, also has its URL scalars rewritten into
//! structured filters: `tag_id=-1`, `cat=-1`, `{taxonomy}_id`,
//! `taxonomy`+`term_id`, `cursor` and `since`.
//!
//! ```text
//! Request ──▶ RewriteRules ──▶ PublicQueryVars ──▶ RequestRouter ──▶ TemplateResolver ──▶ Response
//!                                                    │     │
//!                                         ModuleRegistry   QueryVarsRewriter
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trellis::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let site = Site::builder().build()?;
//!     site.register_taxonomy("genre");
//!     site.register_module("blog", ModuleConfig::new(|action, module, _response| {
//!         info!(module, action, "blog request");
//!     }));
//!
//!     let handled = site.process(&Request::from_uri("/?module=blog&action=list"));
//!     assert!(handled.context.is_module(Some("blog"), None));
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `json-log`: JSON log output

pub use trellis_core as core;
pub use trellis_framework as framework;
pub use trellis_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    // Site - main entry point
    pub use trellis_runtime::{HandledRequest, JsonApi, Request, Site, SiteBuilder};

    // Configuration
    pub use trellis_runtime::config::{ConfigLoader, TrellisConfig};

    // Routing
    pub use trellis_framework::{
        ModuleConfig, RouteContext, RouteOutcome, TaxQueryMerge, TemplateResolver,
    };

    // Data model
    pub use trellis_core::{
        DateBound, DateClause, QueryValue, QueryVars, Response, RouteError, TaxQuery,
        TaxonomyClause,
    };

    // Errors
    pub use trellis_runtime::{RuntimeError, RuntimeResult};

    // Logging
    pub use trellis_runtime::prelude::*;
}

pub use trellis_core::{QueryVars, Response, RouteError};
pub use trellis_framework::{ModuleConfig, ModuleRegistry, RouteContext};
pub use trellis_runtime::{Request, Site};
