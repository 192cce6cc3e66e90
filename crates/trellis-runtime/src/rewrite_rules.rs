//! Pretty-URL rewrite rules.
//!
//! A rule maps a request path to query variables. Patterns are anchored at
//! the start of the path (leading `/` removed); the query template is a
//! `key=value&...` string in which `${n}` refers to capture group `n`.
//! Rules are tried in order and the first match wins.

use regex::Regex;
use tracing::trace;
use url::form_urlencoded;

use crate::error::{RuntimeError, RuntimeResult};

/// `api/<name>/<rest>.json`
const API_NESTED_PATTERN: &str = r"api/([^/]+)/(.*?)\.json?$";
const API_NESTED_QUERY: &str = "module=json&action=mag.${1}.${2}";

/// `api/<name>.json`
const API_PATTERN: &str = r"api/([^/]+)\.json?$";
const API_QUERY: &str = "module=json&action=${1}";

/// A single compiled rule.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    source: String,
    pattern: Regex,
    query: String,
}

impl RewriteRule {
    /// Compiles a rule.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::InvalidRewriteRule`] if the pattern is not a valid regex.
    pub fn new(pattern: &str, query: impl Into<String>) -> RuntimeResult<Self> {
        let compiled = Regex::new(&format!("^(?:{pattern})")).map_err(|source| {
            RuntimeError::InvalidRewriteRule {
                pattern: pattern.to_string(),
                source,
            }
        })?;

        Ok(Self {
            source: pattern.to_string(),
            pattern: compiled,
            query: query.into(),
        })
    }

    /// The pattern as written.
    pub fn pattern(&self) -> &str {
        &self.source
    }

    /// The query template.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Applies the rule, returning the expanded query pairs on a match.
    pub fn apply(&self, path: &str) -> Option<Vec<(String, String)>> {
        let captures = self.pattern.captures(path)?;
        let mut expanded = String::new();
        captures.expand(&self.query, &mut expanded);
        Some(parse_query_string(&expanded))
    }
}

/// An ordered rule list.
#[derive(Debug, Clone, Default)]
pub struct RewriteRules {
    rules: Vec<RewriteRule>,
}

impl RewriteRules {
    /// Creates an empty rule list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the JSON API rules under `root` (e.g. `""` or `blog/`).
    pub fn with_api_rules(root: &str) -> RuntimeResult<Self> {
        let root = regex::escape(root);
        let mut rules = Self::new();
        rules.add(&format!("{root}{API_NESTED_PATTERN}"), API_NESTED_QUERY)?;
        rules.add(&format!("{root}{API_PATTERN}"), API_QUERY)?;
        Ok(rules)
    }

    /// Appends a rule.
    pub fn add(&mut self, pattern: &str, query: impl Into<String>) -> RuntimeResult<()> {
        self.rules.push(RewriteRule::new(pattern, query)?);
        Ok(())
    }

    /// Resolves a path against the rules in order.
    pub fn resolve(&self, path: &str) -> Option<Vec<(String, String)>> {
        let path = path.trim_start_matches('/');
        self.rules.iter().find_map(|rule| {
            let pairs = rule.apply(path)?;
            trace!(path, rule = rule.pattern(), "Rewrite rule matched");
            Some(pairs)
        })
    }

    /// The rules, in match order.
    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Splits `a=1&b=2` into decoded pairs. A key without `=` gets an empty
/// value; `+` and percent escapes are decoded after splitting.
pub(crate) fn parse_query_string(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes()).into_owned().collect()
}
