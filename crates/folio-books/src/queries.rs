//! Folio Catalog Queries
//!
//! The six catalog statements: books in a language, books per genre, most
//! rated books, a per-language summary, and the language and title indexes
//! with their before and after measurements.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::book::Book;
use crate::error::CatalogResult;
use crate::report::CostComparison;
use crate::store::BookStore;
use folio_document::{
    Accumulator, ExecutionStats, IndexSpec, Pipeline, Query, QueryBuilder, TextLanguage, Value,
};
use serde::Serialize;

// =============================================================================
// Result Types
// =============================================================================

/// Number of books carrying one genre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreCount {
    /// Genre name; `None` for genre entries without a name.
    pub genre: Option<String>,
    pub count: u64,
}

/// Book totals for one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageSummary {
    pub language: Option<String>,
    pub total_books: u64,
    /// Mean page count over books with a numeric page count.
    pub avg_page_count: Option<f64>,
}

/// A text search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextMatch {
    pub book: Book,
    pub score: f64,
}

// =============================================================================
// Catalog
// =============================================================================

/// Catalog queries over one book collection.
pub struct Catalog<S> {
    store: S,
    collection: String,
}

impl<S: BookStore> Catalog<S> {
    pub fn new(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Number of books in the collection.
    pub fn total_books(&self) -> CatalogResult<usize> {
        Ok(self.store.count(&self.collection)?)
    }

    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------

    /// Equality filter on `language`.
    pub fn language_query(language: &str) -> Query {
        QueryBuilder::new().eq("language", language).build()
    }

    /// All books written in a language, as stored.
    pub fn books_by_language(&self, language: &str) -> CatalogResult<Vec<Book>> {
        let result = self
            .store
            .find(&self.collection, &Self::language_query(language))?;
        Ok(result.documents.into_iter().map(Book::from).collect())
    }

    // -------------------------------------------------------------------------
    // Aggregation
    // -------------------------------------------------------------------------

    /// Number of books per genre name. A book is counted once per genre
    /// entry; books without genres contribute nothing. Order is unspecified.
    pub fn genre_counts(&self) -> CatalogResult<Vec<GenreCount>> {
        let pipeline = Pipeline::new()
            .unwind("genres")
            .group(Some("genres.name"), vec![("count", Accumulator::SumConst(1))]);

        let result = self.store.aggregate(&self.collection, &pipeline)?;

        Ok(result
            .rows
            .iter()
            .map(|row| GenreCount {
                genre: row.get_path("_id").and_then(Value::as_str).map(String::from),
                count: count_field(row, "count"),
            })
            .collect())
    }

    /// The `n` books with the most ratings, most rated first, projected to
    /// id, title and ratings count. Books whose ratings count is missing or
    /// null are excluded; any other stored value is kept as is and sorts in
    /// the store's cross-type order. Ties keep ascending id order.
    pub fn top_rated(&self, n: usize) -> CatalogResult<Vec<Book>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let query = QueryBuilder::new()
            .ne("ratings_count", Value::Null)
            .sort("ratings_count", false)
            .limit(n)
            .project(&["title", "ratings_count"])
            .build();

        let result = self.store.find(&self.collection, &query)?;
        Ok(result.documents.into_iter().map(Book::from).collect())
    }

    /// Books and mean page count per language, most books first, ties by
    /// ascending language.
    pub fn language_summary(&self) -> CatalogResult<Vec<LanguageSummary>> {
        let pipeline = Pipeline::new()
            .group(
                Some("language"),
                vec![
                    ("total_books", Accumulator::SumConst(1)),
                    ("avg_page_count", Accumulator::Avg("page_count".to_string())),
                ],
            )
            .sort("total_books", false);

        let result = self.store.aggregate(&self.collection, &pipeline)?;

        Ok(result
            .rows
            .iter()
            .map(|row| LanguageSummary {
                language: row.get_path("_id").and_then(Value::as_str).map(String::from),
                total_books: count_field(row, "total_books"),
                avg_page_count: row.get_path("avg_page_count").and_then(Value::as_f64),
            })
            .collect())
    }

    // -------------------------------------------------------------------------
    // Language Index
    // -------------------------------------------------------------------------

    /// Create the ascending index on `language`.
    pub fn index_language(&self) -> CatalogResult<String> {
        Ok(self
            .store
            .create_index(&self.collection, IndexSpec::ascending("language"))?)
    }

    /// Execution statistics of the language filter.
    pub fn explain_language(&self, language: &str) -> CatalogResult<ExecutionStats> {
        Ok(self
            .store
            .explain(&self.collection, &Self::language_query(language))?)
    }

    /// Measure the language filter, create the language index, measure again.
    pub fn compare_language_index(&self, language: &str) -> CatalogResult<CostComparison> {
        let before = self.explain_language(language)?;
        let index = self.index_language()?;
        let after = self.explain_language(language)?;

        tracing::info!(
            index = %index,
            before_docs = before.total_docs_examined,
            after_docs = after.total_docs_examined,
            "language index measured"
        );

        Ok(CostComparison::new(
            format!("language = {:?}", language),
            index,
            before,
            after,
        ))
    }

    // -------------------------------------------------------------------------
    // Title Text Index
    // -------------------------------------------------------------------------

    /// Create the text index on `title`.
    pub fn index_titles(&self, language: TextLanguage) -> CatalogResult<String> {
        Ok(self
            .store
            .create_index(&self.collection, IndexSpec::text("title", language))?)
    }

    /// Text search over titles, best matches first. Requires the title index.
    pub fn search_titles(
        &self,
        term: &str,
        limit: usize,
    ) -> CatalogResult<(Vec<TextMatch>, ExecutionStats)> {
        let result = self.store.text_search(&self.collection, term, limit)?;
        let scores = result.scores.unwrap_or_default();

        let matches = result
            .documents
            .into_iter()
            .enumerate()
            .map(|(i, doc)| TextMatch {
                book: Book::from(doc),
                score: scores.get(i).copied().unwrap_or(0.0),
            })
            .collect();

        Ok((matches, result.stats))
    }

    /// Case-insensitive substring scan of titles, without any index.
    pub fn scan_titles(&self, term: &str) -> CatalogResult<(Vec<Book>, ExecutionStats)> {
        let query = QueryBuilder::new()
            .regex("title", format!("(?i){}", regex::escape(term.trim())))
            .build();

        let result = self.store.find(&self.collection, &query)?;
        let books = result.documents.into_iter().map(Book::from).collect();
        Ok((books, result.stats))
    }

    /// Measure a title scan, create the title text index, measure the text
    /// search.
    pub fn compare_title_index(
        &self,
        term: &str,
        language: TextLanguage,
    ) -> CatalogResult<CostComparison> {
        let (_, before) = self.scan_titles(term)?;
        let index = self.index_titles(language)?;
        let (_, after) = self.search_titles(term, 0)?;

        tracing::info!(
            index = %index,
            before_docs = before.total_docs_examined,
            after_docs = after.total_docs_examined,
            "title index measured"
        );

        Ok(CostComparison::new(
            format!("title search {:?}", term),
            index,
            before,
            after,
        ))
    }
}

fn count_field(row: &Value, field: &str) -> u64 {
    row.get_path(field)
        .and_then(Value::as_i64)
        .map_or(0, |n| n.max(0) as u64)
}

// =============================================================================
// Tests
// =============================================================================
