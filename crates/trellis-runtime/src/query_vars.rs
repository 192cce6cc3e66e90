//! The whitelist of query-string keys a request may set.
//!
//! Anything not listed here is dropped before routing, so a visitor cannot
//! inject internal variables such as `tax_query` or `date_query` through
//! the URL.

use std::collections::BTreeSet;

use tracing::trace;

use trellis_core::QueryVars;

/// Keys understood by the content query that this layer reads or rewrites.
const CORE_PUBLIC_VARS: &[&str] = &[
    "p",
    "page_id",
    "name",
    "pagename",
    "s",
    "paged",
    "post_type",
    "author",
    "cat",
    "tag",
    "tag_id",
    "taxonomy",
    "term",
    "cursor",
    "since",
    "feed",
];

/// Keys added by the router.
const ROUTE_VARS: &[&str] = &["module", "action", "term_id"];

/// Public query variable names.
#[derive(Debug, Clone)]
pub struct PublicQueryVars {
    names: BTreeSet<String>,
}

impl Default for PublicQueryVars {
    fn default() -> Self {
        Self::new()
    }
}

impl PublicQueryVars {
    /// Creates the default whitelist including the routing keys.
    pub fn new() -> Self {
        Self {
            names: CORE_PUBLIC_VARS
                .iter()
                .chain(ROUTE_VARS)
                .map(|name| name.to_string())
                .collect(),
        }
    }

    /// Admits another key. Returns `false` if it was already admitted.
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Admits `{taxonomy}_id`.
    pub fn add_taxonomy(&mut self, taxonomy: &str) -> bool {
        self.add(format!("{taxonomy}_id"))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Builds query variables from raw pairs, dropping unknown keys.
    ///
    /// A later pair overrides an earlier one with the same key.
    pub fn collect<'a, I>(&self, pairs: I) -> QueryVars
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut vars = QueryVars::new();
        for (key, value) in pairs {
            if self.contains(key) {
                vars.set(key, value);
            } else {
                trace!(key, "Dropping non-public query var");
            }
        }
        vars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_keys_are_public() {
        let public = PublicQueryVars::new();

        for key in ["module", "action", "term_id", "cursor", "since", "tag_id", "cat"] {
            assert!(public.contains(key), "{key} should be public");
        }
        assert!(!public.contains("tax_query"));
        assert!(!public.contains("date_query"));
    }

    #[test]
    fn test_taxonomy_keys() {
        let mut public = PublicQueryVars::new();

        assert!(!public.contains("color_id"));
        assert!(public.add_taxonomy("color"));
        assert!(!public.add_taxonomy("color"));
        assert!(public.contains("color_id"));
    }

    #[test]
    fn test_collect_drops_unknown_keys() {
        let public = PublicQueryVars::new();
        let vars = public.collect([
            ("module", "blog"),
            ("tax_query", "injected"),
            ("action", "list"),
            ("action", "detail"),
        ]);

        assert_eq!(vars.text("module"), Some("blog"));
        assert_eq!(vars.text("action"), Some("detail"));
        assert!(!vars.contains("tax_query"));
        assert_eq!(vars.len(), 2);
    }
}
