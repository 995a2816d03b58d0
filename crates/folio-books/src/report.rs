//! Folio Catalog Report
//!
//! Before and after index measurements and the full six-query report.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::book::Book;
use crate::error::CatalogResult;
use crate::queries::{Catalog, GenreCount, LanguageSummary, TextMatch};
use crate::store::BookStore;
use folio_common::QueryConfig;
use folio_document::{ExecutionStats, TextLanguage};
use serde::Serialize;
use std::fmt;

// =============================================================================
// Cost Comparison
// =============================================================================

/// Execution statistics of the same lookup before and after an index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostComparison {
    pub label: String,
    pub index: String,
    pub before: ExecutionStats,
    pub after: ExecutionStats,
}

impl CostComparison {
    pub fn new(
        label: impl Into<String>,
        index: impl Into<String>,
        before: ExecutionStats,
        after: ExecutionStats,
    ) -> Self {
        Self {
            label: label.into(),
            index: index.into(),
            before,
            after,
        }
    }

    /// Documents no longer examined once the index exists.
    pub fn docs_saved(&self) -> usize {
        self.before
            .total_docs_examined
            .saturating_sub(self.after.total_docs_examined)
    }

    /// True when the second run was served by the index.
    pub fn index_used(&self) -> bool {
        self.after.index_used() == Some(self.index.as_str())
    }
}

impl fmt::Display for CostComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (index {})", self.label, self.index)?;
        writeln!(f, "  before: {}", self.before)?;
        writeln!(f, "  after:  {}", self.after)?;
        write!(f, "  {} fewer documents examined", self.docs_saved())
    }
}

// =============================================================================
// Catalog Report
// =============================================================================

/// Results of all six catalog queries, in order.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogReport {
    pub collection: String,
    pub total_books: usize,
    pub language: String,
    pub books_in_language: Vec<Book>,
    pub genre_counts: Vec<GenreCount>,
    pub top_rated: Vec<Book>,
    pub language_summary: Vec<LanguageSummary>,
    pub language_index: CostComparison,
    pub search_term: String,
    pub title_matches: Vec<TextMatch>,
    pub title_index: CostComparison,
}

impl CatalogReport {
    /// Run every query against the catalog. Creates the language and title
    /// indexes as part of the measurements.
    pub fn run<S: BookStore>(catalog: &Catalog<S>, config: &QueryConfig) -> CatalogResult<Self> {
        let text_language = TextLanguage::parse(&config.text_language)?;

        let total_books = catalog.total_books()?;
        let books_in_language = catalog.books_by_language(&config.language)?;
        let mut genre_counts = catalog.genre_counts()?;
        genre_counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));
        let top_rated = catalog.top_rated(config.top_n)?;
        let language_summary = catalog.language_summary()?;
        let language_index = catalog.compare_language_index(&config.language)?;
        let title_index = catalog.compare_title_index(&config.search_term, text_language)?;
        let (title_matches, _) = catalog.search_titles(&config.search_term, 0)?;

        Ok(Self {
            collection: catalog.collection().to_string(),
            total_books,
            language: config.language.clone(),
            books_in_language,
            genre_counts,
            top_rated,
            language_summary,
            language_index,
            search_term: config.search_term.clone(),
            title_matches,
            title_index,
        })
    }
}

/// Titles listed per section before eliding the rest.
const LISTED: usize = 10;

impl fmt::Display for CatalogReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Collection {}: {} books", self.collection, self.total_books)?;

        writeln!(f)?;
        writeln!(
            f,
            "1. Books in language {:?}: {}",
            self.language,
            self.books_in_language.len()
        )?;
        for book in self.books_in_language.iter().take(LISTED) {
            writeln!(f, "   [{}] {}", book.id(), book.title())?;
        }
        if self.books_in_language.len() > LISTED {
            writeln!(f, "   ... {} more", self.books_in_language.len() - LISTED)?;
        }

        writeln!(f)?;
        writeln!(f, "2. Books per genre")?;
        for genre in &self.genre_counts {
            writeln!(
                f,
                "   {:<30} {}",
                genre.genre.as_deref().unwrap_or("(none)"),
                genre.count
            )?;
        }

        writeln!(f)?;
        writeln!(f, "3. Most rated books")?;
        for book in &self.top_rated {
            writeln!(
                f,
                "   {:>8}  [{}] {}",
                ratings_label(book),
                book.id(),
                book.title()
            )?;
        }

        writeln!(f)?;
        writeln!(f, "4. Books per language")?;
        for row in &self.language_summary {
            let avg = row
                .avg_page_count
                .map_or_else(|| "-".to_string(), |a| format!("{:.1}", a));
            writeln!(
                f,
                "   {:<10} {:>6} books  avg pages {}",
                row.language.as_deref().unwrap_or("(none)"),
                row.total_books,
                avg
            )?;
        }

        writeln!(f)?;
        writeln!(f, "5. {}", self.language_index)?;

        writeln!(f)?;
        writeln!(f, "6. {}", self.title_index)?;
        writeln!(
            f,
            "   {} titles match {:?}",
            self.title_matches.len(),
            self.search_term
        )?;
        for hit in self.title_matches.iter().take(LISTED) {
            writeln!(f, "   {:>6.3}  [{}] {}", hit.score, hit.book.id(), hit.book.title())?;
        }

        Ok(())
    }
}

/// Stored ratings count as printed in listings.
pub fn ratings_label(book: &Book) -> String {
    book.ratings_count()
        .map_or_else(String::new, |count| count.to_string())
}

// =============================================================================
// Tests
// =============================================================================
