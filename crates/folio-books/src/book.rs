//! Folio Book Model
//!
//! View of a book document as stored in the catalog collection. The stored
//! document is kept whole, unknown fields included, and reading a field never
//! fails: a missing field and a field of an unexpected type both read as
//! absent.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use chrono::NaiveDate;
use folio_document::{Document, DocumentId, Value};
use serde::Serialize;

// =============================================================================
// Book
// =============================================================================

/// A book document. Serializes exactly as the stored document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Book {
    document: Document,
}

/// An author or genre embedded in a book.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedRef<'a> {
    /// Integer or string id; `None` when missing or of another type.
    pub id: Option<DocumentId>,
    /// The stored name, any type; `None` when missing or null.
    pub name: Option<&'a Value>,
}

impl From<Document> for Book {
    fn from(document: Document) -> Self {
        Self { document }
    }
}

impl Book {
    /// The stored document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn id(&self) -> &DocumentId {
        &self.document.id
    }

    /// Title, or an empty string for untitled books and non-string titles.
    pub fn title(&self) -> &str {
        self.document
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// The stored ratings count, whatever its type. `None` when missing or
    /// null.
    pub fn ratings_count(&self) -> Option<&Value> {
        self.document.get("ratings_count").filter(|v| !v.is_null())
    }

    /// Publication date from an ISO-8601 string. A trailing time part is
    /// ignored and anything unparseable reads as no date.
    pub fn published_date(&self) -> Option<NaiveDate> {
        let raw = self.document.get("published_date").and_then(Value::as_str)?;
        let date = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
    }

    /// Embedded authors; entries that are not objects are skipped.
    pub fn authors(&self) -> impl Iterator<Item = EmbeddedRef<'_>> {
        self.embedded("authors", "author_id")
    }

    /// Embedded genres; entries that are not objects are skipped.
    pub fn genres(&self) -> impl Iterator<Item = EmbeddedRef<'_>> {
        self.embedded("genres", "genre_id")
    }

    fn embedded(
        &self,
        field: &str,
        id_key: &'static str,
    ) -> impl Iterator<Item = EmbeddedRef<'_>> {
        self.document
            .get(field)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(move |entry| match entry {
                Value::Object(obj) => Some(EmbeddedRef {
                    id: obj.get(id_key).and_then(DocumentId::from_value),
                    name: obj.get("name").filter(|v| !v.is_null()),
                }),
                _ => None,
            })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn book(json: serde_json::Value) -> Book {
        Document::from_json(json).unwrap().into()
    }

    #[test]
    fn test_accessors() {
        let book = book(json!({
            "_id": 7,
            "title": "The Lost World",
            "ratings_count": 120,
            "published_date": "1912-10-01",
            "authors": [{"author_id": 3, "name": "Arthur Conan Doyle"}],
            "genres": [{"genre_id": 1, "name": "Adventure"}, {"genre_id": null, "name": null}]
        }));

        assert_eq!(book.id(), &DocumentId::Int(7));
        assert_eq!(book.title(), "The Lost World");
        assert_eq!(book.ratings_count(), Some(&Value::Int(120)));
        assert_eq!(book.published_date(), NaiveDate::from_ymd_opt(1912, 10, 1));

        let authors: Vec<_> = book.authors().collect();
        assert_eq!(authors[0].id, Some(DocumentId::Int(3)));
        assert_eq!(
            authors[0].name.and_then(Value::as_str),
            Some("Arthur Conan Doyle")
        );

        let genres: Vec<_> = book.genres().collect();
        assert_eq!(genres.len(), 2);
        assert_eq!(genres[1], EmbeddedRef { id: None, name: None });
    }

    #[test]
    fn test_sparse_document() {
        let book = book(json!({
            "_id": "b1",
            "ratings_count": null,
            "published_date": "sometime",
            "genres": null
        }));

        assert_eq!(book.title(), "");
        assert!(book.ratings_count().is_none());
        assert!(book.published_date().is_none());
        assert_eq!(book.genres().count(), 0);
        assert_eq!(book.authors().count(), 0);
    }

    #[test]
    fn test_datetime_keeps_date() {
        let book = book(json!({"_id": 1, "published_date": "2004-02-29T00:00:00"}));
        assert_eq!(book.published_date(), NaiveDate::from_ymd_opt(2004, 2, 29));
    }

    #[test]
    fn test_unexpected_types_are_kept() {
        let stored = json!({
            "_id": 1,
            "title": 1984,
            "page_count": 312.0,
            "isbn_13": 9780141439518i64,
            "ratings_count": "n/a",
            "publisher": "Penguin",
            "authors": "Anonymous",
            "genres": [{"genre_id": 2.5, "name": 7}, "Poetry"]
        });
        let book = book(stored.clone());

        assert_eq!(book.title(), "");
        assert_eq!(book.ratings_count(), Some(&Value::from("n/a")));
        assert_eq!(book.authors().count(), 0);

        let genres: Vec<_> = book.genres().collect();
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].id, None);
        assert_eq!(genres[0].name, Some(&Value::Int(7)));

        assert_eq!(serde_json::to_value(&book).unwrap(), stored);
    }
}
