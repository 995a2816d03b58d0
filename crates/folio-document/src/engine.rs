//! Folio Document Engine
//!
//! Core engine that coordinates all document store operations.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::aggregation::{AggregateResult, Pipeline};
use crate::collection::Collection;
use crate::error::{DocumentError, DocumentResult};
use crate::explain::ExecutionStats;
use crate::index::IndexSpec;
use crate::query::{Query, QueryResult};
use crate::types::{Document, DocumentId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

// =============================================================================
// Document Engine Configuration
// =============================================================================

/// Configuration for the document engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_document_size: usize,
    pub max_collections: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_document_size: 16 * 1024 * 1024, // 16MB
            max_collections: 1000,
        }
    }
}

// =============================================================================
// Document Engine
// =============================================================================

/// The main document storage and query engine.
pub struct DocumentEngine {
    config: EngineConfig,
    collections: RwLock<HashMap<String, Arc<Collection>>>,
}

impl DocumentEngine {
    /// Create a new document engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a new document engine with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            collections: RwLock::new(HashMap::new()),
        }
    }

    // -------------------------------------------------------------------------
    // Collection Management
    // -------------------------------------------------------------------------

    /// Create a new collection.
    pub fn create_collection(&self, name: impl Into<String>) -> DocumentResult<()> {
        let name = name.into();
        let mut collections = self.collections.write();

        if collections.contains_key(&name) {
            return Err(DocumentError::CollectionExists(name));
        }

        if collections.len() >= self.config.max_collections {
            return Err(DocumentError::TooManyCollections);
        }

        collections.insert(name.clone(), Arc::new(Collection::new(name)));
        Ok(())
    }

    /// Check if a collection exists.
    pub fn collection_exists(&self, name: &str) -> bool {
        self.collections.read().contains_key(name)
    }

    /// Handle to a collection.
    pub fn collection(&self, name: &str) -> DocumentResult<Arc<Collection>> {
        self.collections
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| DocumentError::CollectionNotFound(name.to_string()))
    }

    // -------------------------------------------------------------------------
    // Document Operations
    // -------------------------------------------------------------------------

    fn check_size(&self, doc: &Document) -> DocumentResult<()> {
        let size = doc.encoded_size();
        if size > self.config.max_document_size {
            return Err(DocumentError::DocumentTooLarge {
                size,
                max: self.config.max_document_size,
            });
        }
        Ok(())
    }

    /// Insert multiple documents. Sizes are checked before anything is
    /// inserted.
    pub fn insert_many(
        &self,
        collection: &str,
        docs: Vec<Document>,
    ) -> DocumentResult<Vec<DocumentId>> {
        for doc in &docs {
            self.check_size(doc)?;
        }

        self.collection(collection)?.insert_many(docs)
    }

    /// Get the number of documents in a collection.
    pub fn count(&self, collection: &str) -> DocumentResult<usize> {
        Ok(self.collection(collection)?.count())
    }

    // -------------------------------------------------------------------------
    // Query Operations
    // -------------------------------------------------------------------------

    /// Find documents matching a query.
    pub fn find(&self, collection: &str, query: &Query) -> DocumentResult<QueryResult> {
        self.collection(collection)?.find(query)
    }

    /// Run a query and report its execution statistics.
    pub fn explain(&self, collection: &str, query: &Query) -> DocumentResult<ExecutionStats> {
        self.collection(collection)?.explain(query)
    }

    /// Full-text search; zero `limit` returns every match.
    pub fn text_search(
        &self,
        collection: &str,
        search: &str,
        limit: usize,
    ) -> DocumentResult<QueryResult> {
        self.collection(collection)?.text_search(search, limit)
    }

    /// Run an aggregation pipeline.
    pub fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> DocumentResult<AggregateResult> {
        self.collection(collection)?.aggregate(pipeline)
    }

    // -------------------------------------------------------------------------
    // Index Operations
    // -------------------------------------------------------------------------

    /// Create an index on a collection and return its name.
    pub fn create_index(&self, collection: &str, spec: IndexSpec) -> DocumentResult<String> {
        self.collection(collection)?.create_index(spec)
    }
}

impl Default for DocumentEngine {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::Accumulator;
    use crate::query::QueryBuilder;

    fn doc(id: i64, language: &str) -> Document {
        let mut doc = Document::with_id(id);
        doc.set("language", language);
        doc
    }

    #[test]
    fn test_collection_management() {
        let engine = DocumentEngine::new();
        assert!(!engine.collection_exists("books"));

        engine.create_collection("books").unwrap();
        assert!(engine.collection_exists("books"));
        assert_eq!(engine.collection("books").unwrap().name(), "books");

        assert!(matches!(
            engine.create_collection("books"),
            Err(DocumentError::CollectionExists(_))
        ));
    }

    #[test]
    fn test_collection_limit() {
        let engine = DocumentEngine::with_config(EngineConfig {
            max_collections: 1,
            ..EngineConfig::default()
        });
        engine.create_collection("books").unwrap();
        assert!(matches!(
            engine.create_collection("genres"),
            Err(DocumentError::TooManyCollections)
        ));
    }

    #[test]
    fn test_document_too_large() {
        let engine = DocumentEngine::with_config(EngineConfig {
            max_document_size: 64,
            ..EngineConfig::default()
        });
        engine.create_collection("books").unwrap();

        let mut big = Document::with_id("big");
        big.set("description", "x".repeat(128));
        assert!(matches!(
            engine.insert_many("books", vec![doc(1, "en"), big]),
            Err(DocumentError::DocumentTooLarge { .. })
        ));
        assert_eq!(engine.count("books").unwrap(), 0);
    }

    #[test]
    fn test_missing_collection() {
        let engine = DocumentEngine::new();
        assert!(matches!(
            engine.find("books", &Query::new()),
            Err(DocumentError::CollectionNotFound(_))
        ));
        assert!(matches!(
            engine.aggregate("books", &Pipeline::new()),
            Err(DocumentError::CollectionNotFound(_))
        ));
        assert!(matches!(
            engine.count("books"),
            Err(DocumentError::CollectionNotFound(_))
        ));
    }

    #[test]
    fn test_query_and_index() {
        let engine = DocumentEngine::new();
        engine.create_collection("books").unwrap();

        let docs = (0..20i64)
            .map(|i| doc(i, if i % 4 == 0 { "fr" } else { "en" }))
            .collect();
        assert_eq!(engine.insert_many("books", docs).unwrap().len(), 20);

        let query = QueryBuilder::new().eq("language", "fr").build();
        let before = engine.explain("books", &query).unwrap();
        assert!(before.is_collection_scan());
        assert_eq!(before.total_docs_examined, 20);

        let name = engine
            .create_index("books", IndexSpec::ascending("language"))
            .unwrap();
        assert_eq!(name, "language_1");

        let after = engine.explain("books", &query).unwrap();
        assert_eq!(after.n_returned, 5);
        assert_eq!(after.total_docs_examined, 5);
        assert_eq!(after.index_used(), Some("language_1"));

        let found = engine.find("books", &query).unwrap();
        assert_eq!(found.documents[0].id, DocumentId::Int(0));
    }

    #[test]
    fn test_aggregate_counts_rows() {
        let engine = DocumentEngine::new();
        engine.create_collection("books").unwrap();
        engine
            .insert_many("books", vec![doc(1, "en"), doc(2, "fr"), doc(3, "en")])
            .unwrap();

        let result = engine
            .aggregate(
                "books",
                &Pipeline::new().group(None, vec![("n", Accumulator::SumConst(1))]),
            )
            .unwrap();
        assert_eq!(result.rows[0].get_path("n").and_then(|v| v.as_i64()), Some(3));
        assert_eq!(result.stats.total_docs_examined, 3);
    }
}
