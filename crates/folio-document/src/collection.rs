//! Folio Document Collection
//!
//! Document storage with maintained indexes, a small access path planner and
//! query, explain and aggregation execution.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::aggregation::{AggregateResult, Pipeline};
use crate::error::{DocumentError, DocumentResult};
use crate::explain::{ExecutionStats, PlanStage};
use crate::index::{DocumentIndex, IndexSpec, IndexType};
use crate::query::{Filter, Matcher, Query, QueryResult};
use crate::text::TextSearch;
use crate::types::{Document, DocumentId, Value};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

// =============================================================================
// Collection
// =============================================================================

/// A collection of documents.
pub struct Collection {
    name: String,
    documents: RwLock<BTreeMap<DocumentId, Document>>,
    indexes: RwLock<Vec<DocumentIndex>>,
}

impl Collection {
    /// Create a new collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: RwLock::new(BTreeMap::new()),
            indexes: RwLock::new(Vec::new()),
        }
    }

    /// Get the collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    // -------------------------------------------------------------------------
    // Document Operations
    // -------------------------------------------------------------------------

    /// Insert a document.
    pub fn insert(&self, doc: Document) -> DocumentResult<DocumentId> {
        let id = doc.id.clone();

        let mut docs = self.documents.write();
        if docs.contains_key(&id) {
            return Err(DocumentError::DuplicateId(id));
        }

        {
            let mut indexes = self.indexes.write();
            for index in indexes.iter_mut() {
                index.index_document(&doc);
            }
        }

        docs.insert(id.clone(), doc);
        Ok(id)
    }

    /// Insert multiple documents, stopping at the first failure.
    pub fn insert_many(&self, docs: Vec<Document>) -> DocumentResult<Vec<DocumentId>> {
        let mut ids = Vec::with_capacity(docs.len());

        for doc in docs {
            ids.push(self.insert(doc)?);
        }

        Ok(ids)
    }

    /// Get the number of documents.
    pub fn count(&self) -> usize {
        self.documents.read().len()
    }

    // -------------------------------------------------------------------------
    // Index Operations
    // -------------------------------------------------------------------------

    /// Create an index and build it over the existing documents.
    ///
    /// Creating an index identical to an existing one is a no-op. A different
    /// index under the same name, or a second text index, is a conflict.
    pub fn create_index(&self, spec: IndexSpec) -> DocumentResult<String> {
        let name = spec.name();

        let docs = self.documents.read();
        let mut indexes = self.indexes.write();

        if let Some(existing) = indexes.iter().find(|idx| idx.name() == name) {
            if existing.spec() == &spec {
                tracing::debug!(collection = %self.name, index = %name, "index already exists");
                return Ok(name);
            }
            return Err(DocumentError::IndexConflict(format!(
                "index {} already exists with different options",
                name
            )));
        }

        if spec.index_type == IndexType::Text {
            if let Some(text) = indexes
                .iter()
                .find(|idx| idx.index_type() == IndexType::Text)
            {
                return Err(DocumentError::IndexConflict(format!(
                    "collection {} already has text index {}",
                    self.name,
                    text.name()
                )));
            }
        }

        let mut index = DocumentIndex::new(spec);
        for doc in docs.values() {
            index.index_document(doc);
        }

        tracing::info!(
            collection = %self.name,
            index = %name,
            documents = docs.len(),
            "created index"
        );

        indexes.push(index);
        Ok(name)
    }

    // -------------------------------------------------------------------------
    // Query Operations
    // -------------------------------------------------------------------------

    /// Find documents matching a query.
    pub fn find(&self, query: &Query) -> DocumentResult<QueryResult> {
        let start = Instant::now();
        let matcher = query.matcher()?;

        let docs = self.documents.read();
        let indexes = self.indexes.read();

        let plan = plan_access(&self.name, &indexes, query)?;
        let (mut matched, mut stats) = scan(&self.name, &docs, &plan, &matcher);
        drop(indexes);

        let text = matches!(plan.stage, PlanStage::Text { .. });
        match &query.sort {
            Some(sort) => matched.sort_by(|a, b| {
                sort.compare(a.0, b.0).then_with(|| a.0.id.cmp(&b.0.id))
            }),
            None if text => {
                matched.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id)))
            }
            None => matched.sort_by(|a, b| a.0.id.cmp(&b.0.id)),
        }

        let limit = match query.limit {
            Some(0) | None => usize::MAX,
            Some(n) => n,
        };

        let (documents, scores): (Vec<Document>, Vec<f64>) = matched
            .into_iter()
            .take(limit)
            .map(|(doc, score)| match &query.projection {
                Some(fields) => (doc.project(fields), score),
                None => (doc.clone(), score),
            })
            .unzip();

        stats.n_returned = documents.len();
        stats.execution_time_micros = start.elapsed().as_micros() as u64;

        tracing::debug!(
            collection = %self.name,
            plan = %stats.plan,
            returned = stats.n_returned,
            docs_examined = stats.total_docs_examined,
            "find"
        );

        Ok(QueryResult {
            documents,
            scores: text.then_some(scores),
            stats,
        })
    }

    /// Run a query and report how it was executed.
    pub fn explain(&self, query: &Query) -> DocumentResult<ExecutionStats> {
        Ok(self.find(query)?.stats)
    }

    /// Full-text search over the collection's text index, best matches first.
    pub fn text_search(&self, search: &str, limit: usize) -> DocumentResult<QueryResult> {
        let query = Query::new()
            .with_filter(Filter::Text {
                search: search.to_string(),
            })
            .with_limit(limit);
        self.find(&query)
    }

    /// Run an aggregation pipeline over every document.
    pub fn aggregate(&self, pipeline: &Pipeline) -> DocumentResult<AggregateResult> {
        let start = Instant::now();
        pipeline.validate()?;

        let rows: Vec<Value> = {
            let docs = self.documents.read();
            docs.values().map(Document::to_value).collect()
        };

        let mut stats = ExecutionStats::new(self.name.clone(), PlanStage::CollScan);
        stats.total_docs_examined = rows.len();

        let rows = pipeline.execute(rows)?;

        stats.n_returned = rows.len();
        stats.execution_time_micros = start.elapsed().as_micros() as u64;

        tracing::debug!(
            collection = %self.name,
            stages = pipeline.stages.len(),
            returned = stats.n_returned,
            "aggregate"
        );

        Ok(AggregateResult { rows, stats })
    }
}

// =============================================================================
// Access Planning
// =============================================================================

/// Chosen access path with the candidates it produced.
struct AccessPlan {
    stage: PlanStage,
    /// Candidate ids in id order; `None` scans every document.
    candidates: Option<Vec<DocumentId>>,
    scores: HashMap<DocumentId, f64>,
    keys_examined: usize,
    /// Phrases each candidate's text field must contain.
    phrases: Option<(String, Vec<String>)>,
}

impl AccessPlan {
    fn collection_scan() -> Self {
        Self {
            stage: PlanStage::CollScan,
            candidates: None,
            scores: HashMap::new(),
            keys_examined: 0,
            phrases: None,
        }
    }
}

/// Pick the access path for a query. A text filter must use the text index;
/// otherwise the first equality filter over an ascending-indexed field is
/// used, falling back to a collection scan.
fn plan_access(
    collection: &str,
    indexes: &[DocumentIndex],
    query: &Query,
) -> DocumentResult<AccessPlan> {
    if let Some(search) = query.text_search() {
        let index = indexes
            .iter()
            .find(|idx| idx.index_type() == IndexType::Text)
            .ok_or_else(|| {
                DocumentError::IndexNotFound(format!(
                    "text index required for text search on {}",
                    collection
                ))
            })?;

        let Some(inverted) = index.text_index() else {
            return Err(DocumentError::IndexNotFound(index.name()));
        };

        let parsed = TextSearch::parse(search, inverted.analyzer());
        let (hits, postings_read) = inverted.search(&parsed);

        let mut ids: Vec<DocumentId> = hits.iter().map(|h| h.id.clone()).collect();
        ids.sort();

        return Ok(AccessPlan {
            stage: PlanStage::Text {
                index_name: index.name(),
                field: index.field().to_string(),
            },
            candidates: Some(ids),
            scores: hits.into_iter().map(|h| (h.id, h.score)).collect(),
            keys_examined: postings_read,
            phrases: (!parsed.phrases.is_empty())
                .then(|| (index.field().to_string(), parsed.phrases)),
        });
    }

    for filter in &query.filters {
        let Filter::Eq { field, value } = filter else {
            continue;
        };
        if !is_index_key(value) {
            continue;
        }
        let Some(index) = ascending_index(indexes, field) else {
            continue;
        };
        let ids = index.find_eq(value);

        return Ok(AccessPlan {
            stage: PlanStage::IxScan {
                index_name: index.name(),
                field: index.field().to_string(),
            },
            keys_examined: ids.len(),
            candidates: Some(ids),
            scores: HashMap::new(),
            phrases: None,
        });
    }

    Ok(AccessPlan::collection_scan())
}

fn ascending_index<'a>(indexes: &'a [DocumentIndex], field: &str) -> Option<&'a DocumentIndex> {
    indexes
        .iter()
        .find(|idx| idx.index_type() == IndexType::Ascending && idx.field() == field)
}

/// Values an ascending index can look up directly.
fn is_index_key(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

/// Examine the plan's candidates and keep those matching every filter.
fn scan<'d>(
    collection: &str,
    docs: &'d BTreeMap<DocumentId, Document>,
    plan: &AccessPlan,
    matcher: &Matcher<'_>,
) -> (Vec<(&'d Document, f64)>, ExecutionStats) {
    let mut stats = ExecutionStats::new(collection, plan.stage.clone());
    stats.total_keys_examined = plan.keys_examined;

    let mut matched = Vec::new();
    let mut consider = |doc: &'d Document| {
        stats.total_docs_examined += 1;
        if !matcher.matches(doc) || !contains_phrases(doc, plan.phrases.as_ref()) {
            return;
        }
        let score = plan.scores.get(&doc.id).copied().unwrap_or(0.0);
        matched.push((doc, score));
    };

    match &plan.candidates {
        Some(ids) => {
            for id in ids {
                if let Some(doc) = docs.get(id) {
                    consider(doc);
                }
            }
        }
        None => {
            for doc in docs.values() {
                consider(doc);
            }
        }
    }

    (matched, stats)
}

fn contains_phrases(doc: &Document, phrases: Option<&(String, Vec<String>)>) -> bool {
    let Some((field, phrases)) = phrases else {
        return true;
    };
    let Some(text) = doc.get(field).and_then(|v| v.as_str()) else {
        return false;
    };
    let text = text.to_lowercase();
    phrases.iter().all(|p| text.contains(p.as_str()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::Accumulator;
    use crate::query::QueryBuilder;
    use crate::text::TextLanguage;

    fn book(id: i64, title: &str, language: &str, ratings: Option<i64>) -> Document {
        let mut doc = Document::with_id(id);
        doc.set("title", title);
        doc.set("language", language);
        doc.set("ratings_count", ratings);
        doc
    }

    fn library() -> Collection {
        let collection = Collection::new("books");
        collection
            .insert_many(vec![
                book(1, "Adventure", "en", Some(10)),
                book(2, "The Adventures of Tom Sawyer", "en", Some(50)),
                book(3, "Le Petit Prince", "fr", None),
                book(10, "A Brief History of Time", "en", Some(50)),
                book(4, "Lost City Adventures", "de", Some(5)),
            ])
            .unwrap();
        collection
    }

    fn ids(result: &QueryResult) -> Vec<DocumentId> {
        result.documents.iter().map(|d| d.id.clone()).collect()
    }

    #[test]
    fn test_insert_and_count() {
        let collection = library();
        assert_eq!(collection.name(), "books");
        assert_eq!(collection.count(), 5);

        let all = collection.find(&Query::new()).unwrap();
        assert_eq!(
            ids(&all),
            [1i64, 2, 3, 4, 10].map(DocumentId::from).to_vec()
        );
    }

    #[test]
    fn test_duplicate_id() {
        let collection = library();
        let result = collection.insert(book(1, "Again", "en", None));
        assert!(matches!(result, Err(DocumentError::DuplicateId(_))));
        assert_eq!(collection.count(), 5);
    }

    #[test]
    fn test_find_uses_index_when_available() {
        let collection = library();
        let query = QueryBuilder::new().eq("language", "en").build();

        let before = collection.find(&query).unwrap();
        assert_eq!(before.documents.len(), 3);
        assert!(before.stats.is_collection_scan());
        assert_eq!(before.stats.total_docs_examined, 5);
        assert_eq!(before.stats.total_keys_examined, 0);

        assert_eq!(
            collection.create_index(IndexSpec::ascending("language")).unwrap(),
            "language_1"
        );

        let after = collection.find(&query).unwrap();
        assert_eq!(after.documents.len(), 3);
        assert_eq!(after.stats.index_used(), Some("language_1"));
        assert_eq!(after.stats.total_docs_examined, 3);
        assert_eq!(after.stats.total_keys_examined, 3);
        assert_eq!(ids(&before), ids(&after));
    }

    #[test]
    fn test_index_maintained_on_insert() {
        let collection = library();
        collection.create_index(IndexSpec::ascending("language")).unwrap();
        collection.insert(book(20, "Nouveau", "fr", None)).unwrap();

        let result = collection
            .find(&QueryBuilder::new().eq("language", "fr").build())
            .unwrap();
        assert_eq!(result.documents.len(), 2);
    }

    #[test]
    fn test_sort_limit_projection() {
        let collection = library();
        let query = QueryBuilder::new()
            .ne("ratings_count", Value::Null)
            .sort("ratings_count", false)
            .limit(3)
            .project(&["title", "ratings_count"])
            .build();

        let result = collection.find(&query).unwrap();
        assert_eq!(ids(&result), [2i64, 10, 1].map(DocumentId::from).to_vec());
        assert!(result.documents[0].get("language").is_none());

        let unlimited = collection
            .find(&QueryBuilder::new().limit(0).build())
            .unwrap();
        assert_eq!(unlimited.documents.len(), 5);
    }

    #[test]
    fn test_create_index_rules() {
        let collection = library();

        collection
            .create_index(IndexSpec::text("title", TextLanguage::English))
            .unwrap();
        assert_eq!(
            collection
                .create_index(IndexSpec::text("title", TextLanguage::English))
                .unwrap(),
            "title_text"
        );
        assert!(matches!(
            collection.create_index(IndexSpec::text("title", TextLanguage::None)),
            Err(DocumentError::IndexConflict(_))
        ));
        assert!(matches!(
            collection.create_index(IndexSpec::text("language", TextLanguage::English)),
            Err(DocumentError::IndexConflict(_))
        ));
        assert_eq!(
            collection.create_index(IndexSpec::ascending("language")).unwrap(),
            "language_1"
        );
        assert_eq!(
            collection.create_index(IndexSpec::ascending("language")).unwrap(),
            "language_1"
        );
    }

    #[test]
    fn test_text_search_requires_index() {
        let collection = library();
        assert!(matches!(
            collection.text_search("adventure", 0),
            Err(DocumentError::IndexNotFound(_))
        ));
    }

    #[test]
    fn test_text_search_scores_and_order() {
        let collection = library();
        collection
            .create_index(IndexSpec::text("title", TextLanguage::English))
            .unwrap();

        let result = collection.text_search("adventure", 0).unwrap();
        let found = ids(&result);
        assert_eq!(found[0], DocumentId::from(1i64));
        assert_eq!(found.len(), 3);
        assert!(found.contains(&DocumentId::from(2i64)) && found.contains(&DocumentId::from(4i64)));

        let scores = result.scores.unwrap();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(result.stats.index_used(), Some("title_text"));
        assert_eq!(result.stats.total_docs_examined, 3);
    }

    #[test]
    fn test_text_search_phrases() {
        let collection = library();
        collection
            .create_index(IndexSpec::text("title", TextLanguage::English))
            .unwrap();

        let result = collection.text_search("\"lost city\"", 0).unwrap();
        assert_eq!(ids(&result), vec![DocumentId::from(4i64)]);
    }

    #[test]
    fn test_aggregate_group_by_language() {
        let collection = library();
        let pipeline = Pipeline::new()
            .group(Some("language"), vec![("total_books", Accumulator::SumConst(1))])
            .sort("total_books", false);

        let result = collection.aggregate(&pipeline).unwrap();
        assert_eq!(result.rows.len(), 3);
        assert_eq!(result.rows[0].get_path("_id").and_then(|v| v.as_str()), Some("en"));
        assert_eq!(result.stats.n_returned, 3);
        assert!(result.stats.is_collection_scan());
        assert_eq!(result.stats.total_docs_examined, 5);
    }
}
