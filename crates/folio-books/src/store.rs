//! Folio Book Store
//!
//! The store surface the catalog queries run against.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use folio_document::{
    AggregateResult, DocumentEngine, DocumentResult, ExecutionStats, IndexSpec, Pipeline, Query,
    QueryResult,
};
use std::sync::Arc;

/// Document store operations used by the catalog. Errors are the store's
/// own and are passed to callers unchanged.
pub trait BookStore {
    /// Find documents with filter, sort, limit and projection.
    fn find(&self, collection: &str, query: &Query) -> DocumentResult<QueryResult>;

    /// Run an aggregation pipeline.
    fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> DocumentResult<AggregateResult>;

    /// Create an index and return its name.
    fn create_index(&self, collection: &str, spec: IndexSpec) -> DocumentResult<String>;

    /// Execution statistics of a query.
    fn explain(&self, collection: &str, query: &Query) -> DocumentResult<ExecutionStats>;

    /// Search the collection's text index.
    fn text_search(
        &self,
        collection: &str,
        search: &str,
        limit: usize,
    ) -> DocumentResult<QueryResult>;

    /// Number of documents in the collection.
    fn count(&self, collection: &str) -> DocumentResult<usize>;
}

impl BookStore for DocumentEngine {
    fn find(&self, collection: &str, query: &Query) -> DocumentResult<QueryResult> {
        DocumentEngine::find(self, collection, query)
    }

    fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> DocumentResult<AggregateResult> {
        DocumentEngine::aggregate(self, collection, pipeline)
    }

    fn create_index(&self, collection: &str, spec: IndexSpec) -> DocumentResult<String> {
        DocumentEngine::create_index(self, collection, spec)
    }

    fn explain(&self, collection: &str, query: &Query) -> DocumentResult<ExecutionStats> {
        DocumentEngine::explain(self, collection, query)
    }

    fn text_search(
        &self,
        collection: &str,
        search: &str,
        limit: usize,
    ) -> DocumentResult<QueryResult> {
        DocumentEngine::text_search(self, collection, search, limit)
    }

    fn count(&self, collection: &str) -> DocumentResult<usize> {
        DocumentEngine::count(self, collection)
    }
}

impl<S: BookStore + ?Sized> BookStore for Arc<S> {
    fn find(&self, collection: &str, query: &Query) -> DocumentResult<QueryResult> {
        (**self).find(collection, query)
    }

    fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> DocumentResult<AggregateResult> {
        (**self).aggregate(collection, pipeline)
    }

    fn create_index(&self, collection: &str, spec: IndexSpec) -> DocumentResult<String> {
        (**self).create_index(collection, spec)
    }

    fn explain(&self, collection: &str, query: &Query) -> DocumentResult<ExecutionStats> {
        (**self).explain(collection, query)
    }

    fn text_search(
        &self,
        collection: &str,
        search: &str,
        limit: usize,
    ) -> DocumentResult<QueryResult> {
        (**self).text_search(collection, search, limit)
    }

    fn count(&self, collection: &str) -> DocumentResult<usize> {
        (**self).count(collection)
    }
}
