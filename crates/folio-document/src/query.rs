//! Folio Document Query
//!
//! Filters, sorting, projection and limits for document retrieval.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::error::{DocumentError, DocumentResult};
use crate::explain::ExecutionStats;
use crate::types::{Document, FieldAccess, Value};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

// =============================================================================
// Query
// =============================================================================

/// A query for filtering documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub sort: Option<Sort>,
    /// Maximum number of results; zero means no limit.
    pub limit: Option<usize>,
    pub projection: Option<Vec<String>>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile the query's patterns once for repeated matching. Text filters
    /// are resolved by the text index and always pass the matcher.
    pub fn matcher(&self) -> DocumentResult<Matcher<'_>> {
        Matcher::new(&self.filters)
    }

    /// The text search string, if the query has a top-level text filter.
    pub fn text_search(&self) -> Option<&str> {
        self.filters.iter().find_map(|f| match f {
            Filter::Text { search } => Some(search.as_str()),
            _ => None,
        })
    }

    /// Add a filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

// =============================================================================
// Filter
// =============================================================================

/// A filter condition.
///
/// A missing field behaves as null, so `Eq(null)` matches documents without
/// the field and `Ne(null)` excludes them. Equality against an array field
/// matches when any element matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Filter {
    Eq { field: String, value: Value },
    Ne { field: String, value: Value },
    Regex { field: String, pattern: String },
    /// Full-text search over the collection's text index.
    Text { search: String },
}

impl Filter {
    fn eval<D: FieldAccess + ?Sized>(&self, doc: &D, patterns: &HashMap<String, Regex>) -> bool {
        match self {
            Self::Eq { field, value } => eq_matches(doc.field(field), value),
            Self::Ne { field, value } => !eq_matches(doc.field(field), value),
            Self::Regex { field, pattern } => match (doc.field(field), patterns.get(pattern)) {
                (Some(value), Some(re)) => any_string(value, |s| re.is_match(s)),
                _ => false,
            },
            Self::Text { .. } => true,
        }
    }
}

fn eq_matches(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(Value::Array(items)) if expected.as_array().is_none() => {
            items.iter().any(|item| item.loose_eq(expected))
        }
        Some(value) => value.loose_eq(expected),
    }
}

fn any_string(value: &Value, pred: impl Fn(&str) -> bool) -> bool {
    match value {
        Value::String(s) => pred(s),
        Value::Array(items) => items.iter().any(|v| v.as_str().map_or(false, &pred)),
        _ => false,
    }
}

// =============================================================================
// Matcher
// =============================================================================

/// Filters with their regular expressions compiled.
pub struct Matcher<'q> {
    filters: &'q [Filter],
    patterns: HashMap<String, Regex>,
}

impl<'q> Matcher<'q> {
    pub fn new(filters: &'q [Filter]) -> DocumentResult<Self> {
        let mut patterns = HashMap::new();
        for filter in filters {
            let Filter::Regex { pattern, .. } = filter else {
                continue;
            };
            if patterns.contains_key(pattern) {
                continue;
            }
            let re = Regex::new(pattern).map_err(|e| DocumentError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            patterns.insert(pattern.clone(), re);
        }

        Ok(Self { filters, patterns })
    }

    pub fn matches<D: FieldAccess + ?Sized>(&self, doc: &D) -> bool {
        self.filters.iter().all(|f| f.eval(doc, &self.patterns))
    }
}

// =============================================================================
// Sort
// =============================================================================

/// Sort specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub ascending: bool,
}

impl Sort {
    /// Compare two records on the sort field; missing sorts as null.
    pub fn compare<D: FieldAccess + ?Sized>(&self, a: &D, b: &D) -> Ordering {
        let null = Value::Null;
        let ord = a
            .field(&self.field)
            .unwrap_or(&null)
            .total_cmp(b.field(&self.field).unwrap_or(&null));
        if self.ascending {
            ord
        } else {
            ord.reverse()
        }
    }
}

// =============================================================================
// Query Builder
// =============================================================================

/// Builder for constructing queries.
#[derive(Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.filters.push(Filter::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn ne(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.filters.push(Filter::Ne {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn regex(mut self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.query.filters.push(Filter::Regex {
            field: field.into(),
            pattern: pattern.into(),
        });
        self
    }

    pub fn sort(mut self, field: impl Into<String>, ascending: bool) -> Self {
        self.query.sort = Some(Sort {
            field: field.into(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn project(mut self, fields: &[&str]) -> Self {
        self.query.projection = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}

// =============================================================================
// Query Result
// =============================================================================

/// Result of a document query.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub documents: Vec<Document>,
    /// Relevance score per document when the query used a text index.
    pub scores: Option<Vec<f64>>,
    pub stats: ExecutionStats,
}

// =============================================================================
// Tests
// =============================================================================
