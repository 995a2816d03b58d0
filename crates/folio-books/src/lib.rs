//! Folio Books - Book Catalog Queries
//!
//! Six statements against a collection of book documents: an equality
//! filter on language, a per-genre count, the most rated books, a
//! per-language summary, and the language and title indexes measured
//! before and after they exist.
//!
//! Key Features:
//! - `Book` view over stored documents, kept whole
//! - `BookStore` trait over the document engine
//! - Batched catalog loading from JSON or JSON Lines files
//! - Text and JSON reports
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

pub mod book;
pub mod error;
pub mod loader;
pub mod queries;
pub mod report;
pub mod store;

pub use book::{Book, EmbeddedRef};
pub use error::{CatalogError, CatalogResult};
pub use loader::{open_catalog, parse_catalog, CatalogLoader, LoadSummary};
pub use queries::{Catalog, GenreCount, LanguageSummary, TextMatch};
pub use report::{ratings_label, CatalogReport, CostComparison};
pub use store::BookStore;
