//! Trellis Runtime - site assembly and request handling.
//!
//! This crate provides:
//! - [`Site`]: owns the module registry, taxonomy catalog, rewrite rules and
//!   template resolver, and turns a [`Request`] into a [`Response`]
//! - Layered configuration (`figment`): `trellis.toml`, profile files and
//!   `TRELLIS_*` environment variables
//! - Logging setup over `tracing-subscriber`
//! - The built-in `json` module and its `api/<name>.json` rewrite rules
//!
//! ```rust,ignore
//! use trellis_runtime::{Request, Site};
//!
//! let site = Site::builder().build()?;
//! site.register_taxonomy("genre");
//!
//! let response = site.handle(&Request::from_uri("/?module=blog&genre_id=4"));
//! ```
//!
//! [`Response`]: trellis_core::Response

pub mod config;
pub mod error;
pub mod json;
pub mod logging;
pub mod query_vars;
pub mod request;
pub mod rewrite_rules;
pub mod site;
pub mod taxonomies;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, TrellisConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use json::{JSON_MODULE, JsonApi, json_module};
pub use logging::{LoggingBuilder, SpanEvents};
pub use query_vars::PublicQueryVars;
pub use request::Request;
pub use rewrite_rules::{RewriteRule, RewriteRules};
pub use site::{HandledRequest, Site, SiteBuilder};
pub use taxonomies::SharedTaxonomies;

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
