//! Folio Catalog Loader
//!
//! Reads a catalog file (a JSON array of book documents or JSON Lines) into
//! the document engine in batches, and builds the companion `authors` and
//! `genres` collections.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::book::Book;
use crate::error::CatalogResult;
use crate::queries::Catalog;
use folio_common::{CatalogConfig, FolioConfig, FolioError};
use folio_document::{Document, DocumentEngine, DocumentId, EngineConfig, Value};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::Path;

pub const AUTHORS_COLLECTION: &str = "authors";
pub const GENRES_COLLECTION: &str = "genres";

// =============================================================================
// Load Summary
// =============================================================================

/// What a load inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub books: usize,
    pub batches: usize,
    pub authors: usize,
    pub genres: usize,
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse catalog content. A leading `[` means a JSON array, anything else is
/// read as JSON Lines with blank lines skipped.
pub fn parse_catalog(content: &str) -> Result<Vec<Document>, FolioError> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') {
        let entries: Vec<JsonValue> = serde_json::from_str(trimmed)?;
        entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| to_document(entry, i + 1))
            .collect()
    } else {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                let entry = serde_json::from_str(line).map_err(|e| FolioError::Parse {
                    line: i + 1,
                    message: e.to_string(),
                })?;
                to_document(entry, i + 1)
            })
            .collect()
    }
}

fn to_document(entry: JsonValue, line: usize) -> Result<Document, FolioError> {
    if !entry.is_object() {
        return Err(FolioError::Parse {
            line,
            message: "book entry is not a JSON object".to_string(),
        });
    }
    Document::from_json(entry).ok_or_else(|| FolioError::Parse {
        line,
        message: "_id must be a string or a number".to_string(),
    })
}

// =============================================================================
// Catalog Loader
// =============================================================================

/// Loads book documents into a document engine.
pub struct CatalogLoader {
    config: CatalogConfig,
}

impl CatalogLoader {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    /// Read and load a catalog file.
    pub fn load_file(
        &self,
        engine: &DocumentEngine,
        path: impl AsRef<Path>,
    ) -> CatalogResult<LoadSummary> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let docs = parse_catalog(&content)?;

        tracing::info!(path = %path.display(), documents = docs.len(), "read catalog file");
        self.load(engine, docs)
    }

    /// Insert books in batches, creating the collection if needed.
    pub fn load(&self, engine: &DocumentEngine, docs: Vec<Document>) -> CatalogResult<LoadSummary> {
        let collection = &self.config.collection;
        if !engine.collection_exists(collection) {
            engine.create_collection(collection.clone())?;
        }

        let mut summary = LoadSummary::default();
        let mut authors = BTreeMap::new();
        let mut genres = BTreeMap::new();

        let batch_size = self.config.batch_size.max(1);
        let mut docs = docs.into_iter().peekable();

        while docs.peek().is_some() {
            let batch: Vec<Document> = docs.by_ref().take(batch_size).collect();

            let books: Vec<Book> = batch.into_iter().map(Book::from).collect();
            if self.config.companion_collections {
                for book in &books {
                    collect_companions(book, &mut authors, &mut genres);
                }
            }

            let batch = books.into_iter().map(Book::into_document).collect();
            let inserted = engine.insert_many(collection, batch)?.len();
            summary.books += inserted;
            summary.batches += 1;

            tracing::info!(
                collection = %collection,
                batch = summary.batches,
                inserted,
                total = summary.books,
                "migrated batch"
            );
        }

        if self.config.companion_collections {
            summary.authors = load_companion(engine, AUTHORS_COLLECTION, authors)?;
            summary.genres = load_companion(engine, GENRES_COLLECTION, genres)?;
        }

        Ok(summary)
    }
}

/// Gather distinct authors and genres keyed by id, first name seen wins.
/// Entries without an integer or string id are skipped.
fn collect_companions(
    book: &Book,
    authors: &mut BTreeMap<DocumentId, Value>,
    genres: &mut BTreeMap<DocumentId, Value>,
) {
    for author in book.authors() {
        if let Some(id) = author.id {
            authors
                .entry(id)
                .or_insert_with(|| author.name.cloned().unwrap_or_default());
        }
    }
    for genre in book.genres() {
        if let Some(id) = genre.id {
            genres
                .entry(id)
                .or_insert_with(|| genre.name.cloned().unwrap_or_default());
        }
    }
}

fn load_companion(
    engine: &DocumentEngine,
    collection: &str,
    entries: BTreeMap<DocumentId, Value>,
) -> CatalogResult<usize> {
    if !engine.collection_exists(collection) {
        engine.create_collection(collection)?;
    }

    let docs: Vec<Document> = entries
        .into_iter()
        .map(|(id, name)| {
            let mut doc = Document::with_id(id);
            doc.set("name", name);
            doc
        })
        .collect();

    let inserted = engine.insert_many(collection, docs)?.len();
    tracing::info!(collection, inserted, "migrated companion collection");
    Ok(inserted)
}

// =============================================================================
// Opening a Catalog
// =============================================================================

/// Build an engine from configuration, load the catalog file and return the
/// catalog over it. `data_file` overrides the configured file.
pub fn open_catalog(
    config: &FolioConfig,
    data_file: Option<&Path>,
) -> CatalogResult<(Catalog<DocumentEngine>, LoadSummary)> {
    let path = data_file
        .or(config.catalog.data_file.as_deref())
        .ok_or_else(|| FolioError::Configuration("no catalog data file given".to_string()))?;

    let engine = DocumentEngine::with_config(EngineConfig {
        max_document_size: config.store.max_document_size,
        max_collections: config.store.max_collections,
    });

    let loader = CatalogLoader::new(config.catalog.clone());
    let summary = loader.load_file(&engine, path)?;

    Ok((Catalog::new(engine, config.catalog.collection.clone()), summary))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use std::io::Write;

    const LINES: &str = r#"{"_id": 1, "title": "One", "authors": [{"author_id": 9, "name": "Ann"}], "genres": [{"genre_id": 1, "name": "Fiction"}]}

{"_id": 2, "title": "Two", "authors": [{"author_id": 9, "name": "Ann"}], "genres": [{"genre_id": 2, "name": "Travel"}, {"genre_id": null, "name": null}]}
{"_id": 3, "title": "Three"}
"#;

    #[test]
    fn test_parse_json_lines() {
        let docs = parse_catalog(LINES).unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[2].id, DocumentId::Int(3));
    }

    #[test]
    fn test_parse_array() {
        let docs = parse_catalog("  [{\"_id\": 1}, {\"_id\": \"b\"}]").unwrap();
        assert_eq!(docs.len(), 2);
        assert!(parse_catalog("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors_report_line() {
        let err = parse_catalog("{\"_id\": 1}\n{broken\n").unwrap_err();
        assert!(matches!(err, FolioError::Parse { line: 2, .. }));

        let err = parse_catalog("[1, 2]").unwrap_err();
        assert!(matches!(err, FolioError::Parse { line: 1, .. }));

        let err = parse_catalog("{\"_id\": [1]}").unwrap_err();
        assert!(matches!(err, FolioError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_load_in_batches_with_companions() {
        let engine = DocumentEngine::new();
        let loader = CatalogLoader::new(CatalogConfig {
            batch_size: 2,
            ..CatalogConfig::default()
        });

        let summary = loader
            .load(&engine, parse_catalog(LINES).unwrap())
            .unwrap();
        assert_eq!(
            summary,
            LoadSummary {
                books: 3,
                batches: 2,
                authors: 1,
                genres: 2,
            }
        );
        assert_eq!(engine.count("books").unwrap(), 3);
        assert_eq!(engine.count(AUTHORS_COLLECTION).unwrap(), 1);
        assert_eq!(engine.count(GENRES_COLLECTION).unwrap(), 2);
    }

    #[test]
    fn test_load_without_companions() {
        let engine = DocumentEngine::new();
        let loader = CatalogLoader::new(CatalogConfig {
            companion_collections: false,
            ..CatalogConfig::default()
        });

        loader.load(&engine, parse_catalog(LINES).unwrap()).unwrap();
        assert!(engine.collection_exists("books"));
        assert!(!engine.collection_exists(AUTHORS_COLLECTION));
        assert!(!engine.collection_exists(GENRES_COLLECTION));
    }

    #[test]
    fn test_load_keeps_documents_of_any_shape() {
        let content = r#"[
            {"_id": 1, "title": "Emma", "page_count": 312.0,
             "authors": [{"author_id": 1, "name": "Jane Austen"}]},
            {"_id": 2, "isbn_13": 9780141439518, "publisher": "Penguin",
             "authors": [{"author_id": "a2", "name": null}, "Anonymous"],
             "genres": [{"genre_id": 1.5, "name": "Odd"}]}
        ]"#;
        let engine = DocumentEngine::new();
        let summary = CatalogLoader::new(CatalogConfig::default())
            .load(&engine, parse_catalog(content).unwrap())
            .unwrap();

        assert_eq!(summary.books, 2);
        assert_eq!(summary.authors, 2);
        assert_eq!(summary.genres, 0);

        let stored = engine.find("books", &Default::default()).unwrap().documents;
        let expected: Vec<serde_json::Value> = serde_json::from_str(content).unwrap();
        let stored: Vec<serde_json::Value> = stored.iter().map(Document::to_json).collect();
        assert_eq!(stored, expected);

        let authors = engine.find(AUTHORS_COLLECTION, &Default::default()).unwrap();
        assert_eq!(authors.documents[0].id, DocumentId::Int(1));
        assert_eq!(authors.documents[1].id, DocumentId::new("a2"));
        assert_eq!(authors.documents[1].get("name"), Some(&Value::Null));
    }

    #[test]
    fn test_open_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LINES.as_bytes()).unwrap();

        let config = FolioConfig::default();
        let (catalog, summary) = open_catalog(&config, Some(file.path())).unwrap();
        assert_eq!(summary.books, 3);
        assert_eq!(catalog.total_books().unwrap(), 3);
    }

    #[test]
    fn test_open_catalog_needs_file() {
        let result = open_catalog(&FolioConfig::default(), None);
        assert!(matches!(
            result,
            Err(CatalogError::Folio(FolioError::Configuration(_)))
        ));
    }
}
