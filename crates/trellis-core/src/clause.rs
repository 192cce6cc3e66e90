//! Structured filter clauses produced by the query rewriter.
//!
//! The shapes mirror the content runtime's query arrays so they can be
//! handed to it unchanged:
//!
//! ```text
//! {"taxonomy": "color", "terms": [7], "field": "term_id"}          exact match
//! {"taxonomy": "post_tag", "field": "term_id", "operator": "NOT EXISTS"}
//! {"before": "2023-11-14 22:13:20"}                                 date bound
//! ```

use chrono::{DateTime, FixedOffset};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

// =============================================================================
// Taxonomy clauses
// =============================================================================

/// The term field a clause matches on. Only term ids are produced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TermField {
    /// Match on numeric term ids.
    #[default]
    #[serde(rename = "term_id")]
    TermId,
}

/// Operators other than the default `IN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermOperator {
    /// The post has no term at all in the taxonomy.
    #[serde(rename = "NOT EXISTS")]
    NotExists,
}

/// The two clause shapes. Exactly one is produced per taxonomy per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermFilter {
    /// Exact match against the listed term ids.
    Terms {
        /// Term ids to match.
        terms: Vec<u64>,
        /// Always [`TermField::TermId`].
        field: TermField,
    },
    /// Negative existence: content with no terms in the taxonomy.
    NotExists {
        /// Always [`TermField::TermId`].
        field: TermField,
        /// Always [`TermOperator::NotExists`].
        operator: TermOperator,
    },
}

/// A single taxonomy filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyClause {
    /// Taxonomy name, e.g. `category` or a custom `color`.
    pub taxonomy: String,
    /// The clause shape.
    #[serde(flatten)]
    pub filter: TermFilter,
}

impl TaxonomyClause {
    /// Creates an exact-term-match clause for a single term id.
    pub fn term(taxonomy: impl Into<String>, term_id: u64) -> Self {
        Self {
            taxonomy: taxonomy.into(),
            filter: TermFilter::Terms {
                terms: vec![term_id],
                field: TermField::TermId,
            },
        }
    }

    /// Creates a negative-existence clause.
    pub fn not_exists(taxonomy: impl Into<String>) -> Self {
        Self {
            taxonomy: taxonomy.into(),
            filter: TermFilter::NotExists {
                field: TermField::TermId,
                operator: TermOperator::NotExists,
            },
        }
    }

    /// Returns `true` for a negative-existence clause.
    pub fn is_not_exists(&self) -> bool {
        matches!(self.filter, TermFilter::NotExists { .. })
    }

    /// Returns the matched term ids, empty for a negative-existence clause.
    pub fn terms(&self) -> &[u64] {
        match &self.filter {
            TermFilter::Terms { terms, .. } => terms,
            TermFilter::NotExists { .. } => &[],
        }
    }
}

// =============================================================================
// Tax query tree
// =============================================================================

/// How clauses inside a group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relation {
    /// Every clause must hold.
    #[default]
    And,
    /// Any clause may hold.
    Or,
}

/// A nested group of tax query nodes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxGroup {
    /// Combination rule for `clauses`.
    #[serde(default)]
    pub relation: Relation,
    /// Member nodes.
    pub clauses: Vec<TaxQueryNode>,
}

/// One entry of a [`TaxQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaxQueryNode {
    /// A leaf clause.
    Clause(TaxonomyClause),
    /// A nested group.
    Group(TaxGroup),
}

/// The `tax_query` parameter: an ordered list of clauses and groups.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxQuery {
    nodes: Vec<TaxQueryNode>,
}

impl TaxQuery {
    /// Creates an empty tax query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tax query whose top-level nodes are the given clauses.
    pub fn from_clauses(clauses: impl IntoIterator<Item = TaxonomyClause>) -> Self {
        Self {
            nodes: clauses.into_iter().map(TaxQueryNode::Clause).collect(),
        }
    }

    /// Appends a leaf clause.
    pub fn push_clause(&mut self, clause: TaxonomyClause) {
        self.nodes.push(TaxQueryNode::Clause(clause));
    }

    /// Appends the given clauses as one AND group.
    pub fn push_group(&mut self, clauses: impl IntoIterator<Item = TaxonomyClause>) {
        self.nodes.push(TaxQueryNode::Group(TaxGroup {
            relation: Relation::And,
            clauses: clauses.into_iter().map(TaxQueryNode::Clause).collect(),
        }));
    }

    /// Top-level nodes.
    pub fn nodes(&self) -> &[TaxQueryNode] {
        &self.nodes
    }

    /// Top-level leaf clauses, skipping groups.
    pub fn clauses(&self) -> impl Iterator<Item = &TaxonomyClause> {
        self.nodes.iter().filter_map(|node| match node {
            TaxQueryNode::Clause(clause) => Some(clause),
            TaxQueryNode::Group(_) => None,
        })
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// =============================================================================
// Date clauses
// =============================================================================

/// Which side of the instant a date clause keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    /// Content published strictly before the instant.
    Before,
    /// Content published strictly after the instant.
    After,
}

impl DateBound {
    /// Key used in the runtime's date query array.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

/// A single date bound.
///
/// `at` is an absolute instant carried in the site's UTC offset, so both
/// the GMT time and the site-local wall time are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateClause {
    /// The bound side.
    pub bound: DateBound,
    /// The instant, expressed in the site offset.
    pub at: DateTime<FixedOffset>,
}

impl DateClause {
    /// Wall-time format used by the content runtime.
    pub const WALL_TIME_FORMAT: &'static str = "%Y-%m-%d %H:%M:%S";

    /// Builds a clause from a Unix timestamp, or `None` if out of range.
    pub fn from_timestamp(bound: DateBound, secs: i64, offset: FixedOffset) -> Option<Self> {
        let utc = DateTime::from_timestamp(secs, 0)?;
        Some(Self {
            bound,
            at: utc.with_timezone(&offset),
        })
    }

    /// Site-local wall time, e.g. `2023-11-15 06:13:20`.
    pub fn local_wall_time(&self) -> String {
        self.at.format(Self::WALL_TIME_FORMAT).to_string()
    }

    /// GMT wall time.
    pub fn gmt_wall_time(&self) -> String {
        self.at.naive_utc().format(Self::WALL_TIME_FORMAT).to_string()
    }
}

impl Serialize for DateClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.bound.as_str(), &self.local_wall_time())?;
        map.end()
    }
}
