//! # Trellis Core
//!
//! The data model shared by every Trellis layer.
//!
//! This crate has no routing logic of its own. It defines the values that
//! flow through one request:
//!
//! - **Query variables**: the mutable parameter bag parsed from a URL
//!   ([`QueryVars`], [`QueryValue`])
//! - **Filter clauses**: structured taxonomy and date conditions produced by
//!   the query rewriter ([`TaxonomyClause`], [`TaxQuery`], [`DateClause`])
//! - **Taxonomy catalog**: the read-only view of registered taxonomies
//!   ([`TaxonomyCatalog`])
//! - **Response**: the output sink a module callback may halt ([`Response`])
//! - **Errors**: the fatal routing failure ([`RouteError`])
//!
//! ## Request Flow
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌───────────────┐     ┌──────────────────┐
//! │   Request   │────▶│  QueryVars   │────▶│ RequestRouter │────▶│ TemplateResolver │
//! │ (path, qs)  │     │ (mutable)    │     │ + rewriter    │     │ (path or fatal)  │
//! └─────────────┘     └──────────────┘     └───────────────┘     └──────────────────┘
//! ```

pub mod clause;
pub mod error;
pub mod query;
pub mod response;
pub mod taxonomy;

pub use clause::{
    DateBound, DateClause, Relation, TaxGroup, TaxQuery, TaxQueryNode, TaxonomyClause, TermField,
    TermFilter, TermOperator,
};
pub use error::{ROUTING_ERROR_MESSAGE, RouteError, RouteResult};
pub use query::{QueryValue, QueryVars};
pub use response::Response;
pub use taxonomy::{BUILTIN_TAXONOMIES, CATEGORY, POST_TAG, StaticTaxonomyCatalog, TaxonomyCatalog};
