//! Folio Document Index
//!
//! Ascending single-field indexes and text indexes for collections.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::text::{Analyzer, TextLanguage, TextSearch};
use crate::types::{Document, DocumentId, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

// =============================================================================
// Index Specification
// =============================================================================

/// Type of document index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    /// Ordered index on a single field, ascending.
    Ascending,
    /// Full-text index over a string field.
    Text,
}

/// What to index and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub field: String,
    pub index_type: IndexType,
    /// Stemming and stop word language of a text index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<TextLanguage>,
}

impl IndexSpec {
    /// Ascending index on one field.
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            index_type: IndexType::Ascending,
            default_language: None,
        }
    }

    /// Text index on one field with the given default language.
    pub fn text(field: impl Into<String>, language: TextLanguage) -> Self {
        Self {
            field: field.into(),
            index_type: IndexType::Text,
            default_language: Some(language),
        }
    }

    /// Index name, `<field>_1` or `<field>_text`.
    pub fn name(&self) -> String {
        match self.index_type {
            IndexType::Ascending => format!("{}_1", self.field),
            IndexType::Text => format!("{}_text", self.field),
        }
    }

    pub fn language(&self) -> TextLanguage {
        self.default_language.unwrap_or_default()
    }
}

// =============================================================================
// Document Index
// =============================================================================

/// Index for efficient document queries.
pub struct DocumentIndex {
    spec: IndexSpec,
    entries: BTreeMap<IndexKey, BTreeSet<DocumentId>>,
    text_index: Option<InvertedIndex>,
}

impl DocumentIndex {
    /// Create a new, empty index.
    pub fn new(spec: IndexSpec) -> Self {
        let text_index = match spec.index_type {
            IndexType::Text => Some(InvertedIndex::new(spec.language())),
            IndexType::Ascending => None,
        };

        Self {
            spec,
            entries: BTreeMap::new(),
            text_index,
        }
    }

    pub fn spec(&self) -> &IndexSpec {
        &self.spec
    }

    pub fn name(&self) -> String {
        self.spec.name()
    }

    /// Get the indexed field name.
    pub fn field(&self) -> &str {
        &self.spec.field
    }

    /// Get the index type.
    pub fn index_type(&self) -> IndexType {
        self.spec.index_type
    }

    pub fn text_index(&self) -> Option<&InvertedIndex> {
        self.text_index.as_ref()
    }

    /// Index a document.
    pub fn index_document(&mut self, doc: &Document) {
        let value = doc.get(&self.spec.field);

        match self.spec.index_type {
            IndexType::Text => {
                if let (Some(text), Some(idx)) =
                    (value.and_then(|v| v.as_str()), self.text_index.as_mut())
                {
                    idx.index_document(&doc.id, text);
                }
            }
            IndexType::Ascending => {
                for key in IndexKey::keys_for(value) {
                    self.entries.entry(key).or_default().insert(doc.id.clone());
                }
            }
        }
    }

    /// Find documents by exact value, in id order.
    pub fn find_eq(&self, value: &Value) -> Vec<DocumentId> {
        self.entries
            .get(&IndexKey::from_value(value))
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

}

// =============================================================================
// Index Key
// =============================================================================

/// Key of an ascending index. Ordered like [`Value::total_cmp`].
#[derive(Debug, Clone)]
struct IndexKey(Value);

impl IndexKey {
    fn from_value(value: &Value) -> Self {
        Self(value.clone())
    }

    /// Keys a field value is stored under. Missing fields index as null and
    /// array fields index every element.
    fn keys_for(value: Option<&Value>) -> Vec<Self> {
        match value {
            None => vec![Self(Value::Null)],
            Some(Value::Array(items)) if !items.is_empty() => {
                let mut keys: Vec<Self> = Vec::with_capacity(items.len());
                for item in items {
                    if !keys.iter().any(|k| k.0.loose_eq(item)) {
                        keys.push(Self(item.clone()));
                    }
                }
                keys
            }
            Some(Value::Array(_)) => vec![Self(Value::Null)],
            Some(value) => vec![Self(value.clone())],
        }
    }
}

impl PartialEq for IndexKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.loose_eq(&other.0)
    }
}

impl Eq for IndexKey {}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// =============================================================================
// Inverted Index
// =============================================================================

/// A text index hit with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredId {
    pub id: DocumentId,
    pub score: f64,
}

/// Inverted index for full-text search.
pub struct InvertedIndex {
    analyzer: Analyzer,
    terms: HashMap<String, HashMap<DocumentId, u32>>,
    doc_terms: HashMap<DocumentId, HashSet<String>>,
    doc_lengths: HashMap<DocumentId, u32>,
}

impl InvertedIndex {
    pub fn new(language: TextLanguage) -> Self {
        Self {
            analyzer: Analyzer::new(language),
            terms: HashMap::new(),
            doc_terms: HashMap::new(),
            doc_lengths: HashMap::new(),
        }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Index a document's text.
    pub fn index_document(&mut self, doc_id: &DocumentId, text: &str) {
        let tokens = self.analyzer.terms(text);
        if tokens.is_empty() {
            return;
        }

        let mut doc_term_set = HashSet::new();
        for token in &tokens {
            *self
                .terms
                .entry(token.clone())
                .or_default()
                .entry(doc_id.clone())
                .or_insert(0) += 1;
            doc_term_set.insert(token.clone());
        }

        self.doc_lengths.insert(doc_id.clone(), tokens.len() as u32);
        self.doc_terms.insert(doc_id.clone(), doc_term_set);
    }

    /// Documents containing any positive term and no negated term, with the
    /// number of postings read. Scores favour more occurrences in shorter text.
    pub fn search(&self, search: &TextSearch) -> (Vec<ScoredId>, usize) {
        if search.is_empty() {
            return (Vec::new(), 0);
        }

        let mut scores: HashMap<&DocumentId, f64> = HashMap::new();
        let mut postings_read = 0;

        for term in &search.terms {
            let Some(postings) = self.terms.get(term) else {
                continue;
            };
            postings_read += postings.len();

            for (id, freq) in postings {
                let len = self.doc_lengths.get(id).copied().unwrap_or(1).max(1) as f64;
                *scores.entry(id).or_insert(0.0) += *freq as f64 * (0.5 + 0.5 / len);
            }
        }

        let hits = scores
            .into_iter()
            .filter(|(id, _)| !self.contains_any(id, &search.negated))
            .map(|(id, score)| ScoredId {
                id: id.clone(),
                score,
            })
            .collect();

        (hits, postings_read)
    }

    fn contains_any(&self, id: &DocumentId, terms: &[String]) -> bool {
        self.doc_terms
            .get(id)
            .map_or(false, |set| terms.iter().any(|t| set.contains(t)))
    }
}

// =============================================================================
// Tests
// =============================================================================
