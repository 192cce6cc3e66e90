//! Inbound request as seen by the router.
//!
//! A [`Request`] is the request path plus decoded query-string pairs.

use crate::json::JSON_MODULE;
use crate::rewrite_rules::parse_query_string;

/// A request path plus query-string pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    path: String,
    query: Vec<(String, String)>,
}

impl Request {
    /// Creates a request for a path with no query string.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Splits `path?a=1&b=2` into a request, percent-decoding the query.
    pub fn from_uri(uri: &str) -> Self {
        match uri.split_once('?') {
            Some((path, query)) => Self {
                path: path.to_string(),
                query: parse_query_string(query),
            },
            None => Self::new(uri),
        }
    }

    /// Adds a query-string pair.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// The request path, as matched against rewrite rules.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query-string pairs in order.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether the request targets the JSON API, either through an
    /// `api/....json` path or an explicit `module=json`.
    pub fn is_json(&self) -> bool {
        let path = self.path.trim_start_matches('/');
        let api_path = (path.starts_with("api/") || path.contains("/api/"))
            && (path.ends_with(".json") || path.ends_with(".jso"));

        api_path
            || self
                .query_pairs()
                .any(|(k, v)| k == "module" && v == JSON_MODULE)
    }
}
