//! Query variable rewriting.
//!
//! Translates the ad-hoc scalars a URL carries into the structured filters
//! the content query understands. Steps run in a fixed order because later
//! steps see the keys earlier ones consumed:
//!
//! 1. `tag_id=-1` / `cat=-1` become "no terms" clauses for the built-in
//!    tag and category taxonomies.
//! 2. `{taxonomy}_id` for every custom taxonomy becomes an exact-term
//!    clause, or a "no terms" clause for `-1`.
//! 3. `taxonomy` + `term_id` without `term`: a numeric id becomes an
//!    exact-term clause (`-1` a "no terms" clause), anything else is treated
//!    as a slug and copied to `term`.
//! 4. Generated clauses are written to `tax_query`.
//! 5. `cursor` / `since` timestamps become `before` / `after` date bounds.
//!
//! Malformed input is skipped, never reported as an error.

use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use trellis_core::{
    CATEGORY, DateBound, DateClause, POST_TAG, QueryVars, TaxQuery, TaxonomyCatalog,
    TaxonomyClause,
};

/// The term-id value that selects a "no terms" clause.
const NO_TERMS: i64 = -1;

/// How generated clauses are written into an existing `tax_query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxQueryMerge {
    /// `tax_query` is overwritten with the generated clauses only. The
    /// appended form is still computed and reported.
    #[default]
    Replace,
    /// Generated clauses are appended to the existing `tax_query` as one AND
    /// group.
    Append,
}

/// What a rewrite produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Taxonomy clauses generated for this request, in order.
    pub clauses: Vec<TaxonomyClause>,
    /// The existing `tax_query` with `clauses` appended as one group, or
    /// `clauses` alone when there was none. `None` if nothing was generated.
    pub merged_tax_query: Option<TaxQuery>,
    /// Date bounds generated for this request.
    pub date_clauses: Vec<DateClause>,
}

impl RewriteReport {
    /// Returns `true` if the rewrite generated nothing.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && self.date_clauses.is_empty()
    }
}

/// Converts a site UTC offset in hours (e.g. `8`, `-3.5`) to a [`FixedOffset`].
pub fn offset_from_hours(hours: f64) -> Option<FixedOffset> {
    if !hours.is_finite() {
        return None;
    }
    FixedOffset::east_opt((hours * 3600.0).round() as i32)
}

/// Rewrites query variables into taxonomy and date filters.
#[derive(Clone)]
pub struct QueryVarsRewriter {
    catalog: Arc<dyn TaxonomyCatalog>,
    offset: FixedOffset,
    merge: TaxQueryMerge,
}

impl QueryVarsRewriter {
    /// Creates a rewriter over the given taxonomy catalog, in UTC.
    pub fn new(catalog: Arc<dyn TaxonomyCatalog>) -> Self {
        Self {
            catalog,
            offset: Utc.fix(),
            merge: TaxQueryMerge::default(),
        }
    }

    /// Sets the site UTC offset used for date bounds.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the `tax_query` merge policy.
    pub fn with_merge(mut self, merge: TaxQueryMerge) -> Self {
        self.merge = merge;
        self
    }

    /// The site UTC offset.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Rewrites `vars` in place.
    pub fn rewrite(&self, vars: &mut QueryVars) -> RewriteReport {
        let mut clauses = Vec::new();

        self.rewrite_legacy_sentinels(vars, &mut clauses);
        self.rewrite_custom_taxonomies(vars, &mut clauses);
        self.rewrite_term_pair(vars, &mut clauses);

        let merged_tax_query = self.write_tax_query(vars, &clauses);
        let date_clauses = self.rewrite_date_bounds(vars);

        RewriteReport {
            clauses,
            merged_tax_query,
            date_clauses,
        }
    }

    fn rewrite_legacy_sentinels(&self, vars: &mut QueryVars, clauses: &mut Vec<TaxonomyClause>) {
        for (key, taxonomy) in [("tag_id", POST_TAG), ("cat", CATEGORY)] {
            if !vars.is_empty_var(key) && vars.int(key) == Some(NO_TERMS) {
                clauses.push(TaxonomyClause::not_exists(taxonomy));
                vars.remove(key);
            }
        }
    }

    fn rewrite_custom_taxonomies(&self, vars: &mut QueryVars, clauses: &mut Vec<TaxonomyClause>) {
        for taxonomy in self.catalog.custom_taxonomies() {
            let key = format!("{taxonomy}_id");
            if vars.is_empty_var(&key) {
                continue;
            }
            let Some(value) = vars.remove(&key) else {
                continue;
            };

            match value.as_int() {
                Some(NO_TERMS) => clauses.push(TaxonomyClause::not_exists(taxonomy)),
                Some(id) if id > 0 => clauses.push(TaxonomyClause::term(taxonomy, id as u64)),
                _ => debug!(%taxonomy, ?value, "Ignoring malformed term id"),
            }
        }
    }

    fn rewrite_term_pair(&self, vars: &mut QueryVars, clauses: &mut Vec<TaxonomyClause>) {
        if !vars.is_empty_var("term") {
            return;
        }
        let (Some(taxonomy), Some(term_id)) =
            (vars.non_empty_text("taxonomy"), vars.non_empty_text("term_id"))
        else {
            return;
        };

        match parse_numeric_id(term_id) {
            Some(NO_TERMS) => clauses.push(TaxonomyClause::not_exists(taxonomy)),
            Some(id) if id >= 0 => clauses.push(TaxonomyClause::term(taxonomy, id as u64)),
            Some(id) => debug!(%taxonomy, id, "Ignoring negative term id"),
            None => {
                let slug = term_id.to_string();
                debug!(%slug, "Treating non-numeric term_id as a term slug");
                vars.set("term", slug);
            }
        }
    }

    fn write_tax_query(
        &self,
        vars: &mut QueryVars,
        clauses: &[TaxonomyClause],
    ) -> Option<TaxQuery> {
        if clauses.is_empty() {
            return None;
        }

        let merged = match vars.tax_query() {
            Some(existing) if !existing.is_empty() => {
                let mut merged = existing.clone();
                merged.push_group(clauses.iter().cloned());
                merged
            }
            _ => TaxQuery::from_clauses(clauses.iter().cloned()),
        };

        let written = match self.merge {
            TaxQueryMerge::Replace => TaxQuery::from_clauses(clauses.iter().cloned()),
            TaxQueryMerge::Append => merged.clone(),
        };
        vars.set("tax_query", written);

        Some(merged)
    }

    fn rewrite_date_bounds(&self, vars: &mut QueryVars) -> Vec<DateClause> {
        let mut date_query = vars.date_query().map(<[_]>::to_vec).unwrap_or_default();
        let mut generated = Vec::new();

        for (key, bound) in [("cursor", DateBound::Before), ("since", DateBound::After)] {
            if vars.is_empty_var(key) {
                continue;
            }
            match vars
                .int(key)
                .and_then(|secs| DateClause::from_timestamp(bound, secs, self.offset))
            {
                Some(clause) => {
                    date_query.push(clause);
                    generated.push(clause);
                }
                None => debug!(key, "Ignoring malformed timestamp"),
            }
        }

        if !date_query.is_empty() {
            vars.set("date_query", date_query);
        }

        generated
    }
}

impl std::fmt::Debug for QueryVarsRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryVarsRewriter")
            .field("taxonomies", &self.catalog.custom_taxonomies())
            .field("offset", &self.offset)
            .field("merge", &self.merge)
            .finish()
    }
}

/// Parses an optionally signed integer term id. Anything else is a slug.
fn parse_numeric_id(value: &str) -> Option<i64> {
    let digits = value.strip_prefix(['-', '+']).unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
