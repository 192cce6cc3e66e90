//! The per-request query variable bag.
//!
//! Values arrive as strings from the URL and are coerced on read with the
//! runtime's loose rules: a missing key, `""` and `"0"` all count as empty,
//! and numeric reads are best-effort (a parse failure reads as absent).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::clause::{DateClause, TaxQuery};

/// A single query variable value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    /// A scalar as parsed from the URL.
    Text(String),
    /// A structured taxonomy filter.
    TaxQuery(TaxQuery),
    /// A list of date bounds.
    DateQuery(Vec<DateClause>),
}

impl QueryValue {
    /// Returns the scalar text, if this is a scalar.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Best-effort integer read of a scalar.
    pub fn as_int(&self) -> Option<i64> {
        self.as_text().and_then(|s| s.trim().parse().ok())
    }

    /// Loose emptiness: `""`, `"0"` or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty() || s == "0",
            Self::TaxQuery(q) => q.is_empty(),
            Self::DateQuery(d) => d.is_empty(),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<TaxQuery> for QueryValue {
    fn from(value: TaxQuery) -> Self {
        Self::TaxQuery(value)
    }
}

impl From<Vec<DateClause>> for QueryValue {
    fn from(value: Vec<DateClause>) -> Self {
        Self::DateQuery(value)
    }
}

/// Named query variables for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryVars {
    vars: BTreeMap<String, QueryValue>,
}

impl QueryVars {
    /// Creates an empty set of query variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.vars.get(key)
    }

    /// Returns the scalar text for `key`.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(QueryValue::as_text)
    }

    /// Returns the scalar text for `key` unless it is loosely empty.
    pub fn non_empty_text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .filter(|v| !v.is_empty())
            .and_then(QueryValue::as_text)
    }

    /// Best-effort integer read of `key`.
    pub fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(QueryValue::as_int)
    }

    /// Returns `true` if `key` is missing or loosely empty.
    pub fn is_empty_var(&self, key: &str) -> bool {
        self.get(key).is_none_or(QueryValue::is_empty)
    }

    /// Returns the structured `tax_query`, if set.
    pub fn tax_query(&self) -> Option<&TaxQuery> {
        match self.get("tax_query") {
            Some(QueryValue::TaxQuery(q)) => Some(q),
            _ => None,
        }
    }

    /// Returns the `date_query` list, if set.
    pub fn date_query(&self) -> Option<&[DateClause]> {
        match self.get("date_query") {
            Some(QueryValue::DateQuery(d)) => Some(d),
            _ => None,
        }
    }

    /// Sets `key`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        self.vars.remove(key)
    }

    /// Returns `true` if `key` is present, even if empty.
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Iterates over all variables in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns `true` if no variables are set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryVars
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Self::new();
        for (key, value) in iter {
            vars.set(key, value);
        }
        vars
    }
}
