//! Folio Text Analysis
//!
//! Tokenizing, stop word removal and stemming for text indexes and text
//! search strings.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::error::{DocumentError, DocumentResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// =============================================================================
// Text Language
// =============================================================================

/// Language used by a text index for stop words and stemming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextLanguage {
    English,
    /// Plain tokenizing: no stop words, no stemming.
    None,
}

impl TextLanguage {
    /// Parse a language name or ISO code.
    pub fn parse(name: &str) -> DocumentResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "none" => Ok(Self::None),
            other => Err(DocumentError::UnsupportedLanguage(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "english",
            Self::None => "none",
        }
    }
}

impl Default for TextLanguage {
    fn default() -> Self {
        Self::English
    }
}

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "all", "an", "and", "any", "are", "as", "at", "be", "been", "but", "by",
    "can", "did", "do", "does", "for", "from", "had", "has", "have", "he", "her", "his", "how",
    "i", "if", "in", "into", "is", "it", "its", "my", "no", "not", "of", "on", "or", "our",
    "she", "so", "than", "that", "the", "their", "then", "there", "these", "they", "this",
    "those", "to", "was", "we", "were", "what", "when", "where", "which", "who", "whom", "why",
    "will", "with", "you", "your",
];

// =============================================================================
// Analyzer
// =============================================================================

/// Turns text into index terms for one language.
#[derive(Debug, Clone)]
pub struct Analyzer {
    language: TextLanguage,
    stop_words: HashSet<&'static str>,
}

impl Analyzer {
    pub fn new(language: TextLanguage) -> Self {
        let stop_words = match language {
            TextLanguage::English => ENGLISH_STOP_WORDS.iter().copied().collect(),
            TextLanguage::None => HashSet::new(),
        };
        Self {
            language,
            stop_words,
        }
    }

    /// Lowercased words of the text, split on anything not alphanumeric.
    pub fn words(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Index terms of the text, in order, duplicates kept.
    pub fn terms(&self, text: &str) -> Vec<String> {
        Self::words(text)
            .into_iter()
            .filter(|w| !self.stop_words.contains(w.as_str()))
            .map(|w| self.stem(&w))
            .collect()
    }

    /// Reduce a single lowercased word to its stem.
    pub fn stem(&self, word: &str) -> String {
        match self.language {
            TextLanguage::English => stem_english(word),
            TextLanguage::None => word.to_string(),
        }
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn has_vowel(s: &str) -> bool {
    s.chars().any(is_vowel)
}

/// Light suffix-stripping stemmer. Plural, past tense and gerund forms and a
/// trailing silent "e" collapse to one stem, e.g. "adventure", "adventures"
/// and "adventuring" all become "adventur".
fn stem_english(word: &str) -> String {
    if word.chars().count() <= 3 || !word.is_ascii() {
        return word.to_string();
    }

    let mut stem = word.to_string();

    if let Some(base) = stem.strip_suffix("sses") {
        stem = format!("{}ss", base);
    } else if let Some(base) = stem.strip_suffix("ies") {
        stem = format!("{}i", base);
    } else if !stem.ends_with("ss") && !stem.ends_with("us") && !stem.ends_with("is") {
        if let Some(base) = stem.strip_suffix('s') {
            stem = base.to_string();
        }
    }

    let mut stripped_verb = false;
    for suffix in ["ing", "ed"] {
        if let Some(base) = stem.strip_suffix(suffix) {
            if base.len() >= 2 && has_vowel(base) {
                stem = base.to_string();
                stripped_verb = true;
            }
            break;
        }
    }

    if stripped_verb {
        let bytes = stem.as_bytes();
        let n = bytes.len();
        if n >= 2 && bytes[n - 1] == bytes[n - 2] && !matches!(bytes[n - 1], b'l' | b's' | b'z') {
            stem.pop();
        }
    }

    if stem.len() > 3 {
        if let Some(base) = stem.strip_suffix('e') {
            stem = base.to_string();
        } else if let Some(base) = stem.strip_suffix('y') {
            if base.chars().last().map_or(false, |c| !is_vowel(c)) {
                stem = format!("{}i", base);
            }
        }
    }

    stem
}

// =============================================================================
// Text Search
// =============================================================================

/// A parsed text search string.
///
/// Plain words match any document containing at least one of them.
/// `"quoted phrases"` must occur in the indexed text and `-word` excludes
/// documents containing the word.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextSearch {
    pub terms: Vec<String>,
    pub phrases: Vec<String>,
    pub negated: Vec<String>,
}

impl TextSearch {
    pub fn parse(search: &str, analyzer: &Analyzer) -> Self {
        let mut parsed = TextSearch::default();
        let mut rest = search;

        while let Some(start) = rest.find('"') {
            let (before, after) = rest.split_at(start);
            parsed.add_words(before, analyzer);

            let after = &after[1..];
            match after.find('"') {
                Some(end) => {
                    let phrase = after[..end].trim();
                    if !phrase.is_empty() {
                        parsed.phrases.push(phrase.to_lowercase());
                        for term in analyzer.terms(phrase) {
                            parsed.push_term(term);
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    rest = after;
                }
            }
        }
        parsed.add_words(rest, analyzer);

        parsed
    }

    fn add_words(&mut self, text: &str, analyzer: &Analyzer) {
        for token in text.split_whitespace() {
            if let Some(negated) = token.strip_prefix('-') {
                for term in analyzer.terms(negated) {
                    if !self.negated.contains(&term) {
                        self.negated.push(term);
                    }
                }
            } else {
                for term in analyzer.terms(token) {
                    self.push_term(term);
                }
            }
        }
    }

    fn push_term(&mut self, term: String) {
        if !self.terms.contains(&term) {
            self.terms.push(term);
        }
    }

    /// True when nothing positive is left to look up.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!(TextLanguage::parse("en").unwrap(), TextLanguage::English);
        assert_eq!(TextLanguage::parse("English").unwrap(), TextLanguage::English);
        assert_eq!(TextLanguage::parse("none").unwrap(), TextLanguage::None);
        assert!(matches!(
            TextLanguage::parse("klingon"),
            Err(DocumentError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_stemming_collapses_forms() {
        let analyzer = Analyzer::new(TextLanguage::English);
        let stem = analyzer.stem("adventure");
        assert_eq!(stem, "adventur");
        assert_eq!(analyzer.stem("adventures"), stem);
        assert_eq!(analyzer.stem("adventuring"), stem);
        assert_eq!(analyzer.stem("adventured"), stem);

        assert_eq!(analyzer.stem("stories"), analyzer.stem("story"));
        assert_eq!(analyzer.stem("running"), "run");
        assert_eq!(analyzer.stem("king"), "king");
        assert_eq!(analyzer.stem("class"), "class");
    }

    #[test]
    fn test_stop_words_removed() {
        let analyzer = Analyzer::new(TextLanguage::English);
        let terms = analyzer.terms("The Adventures of Tom Sawyer");
        assert_eq!(terms, vec!["adventur", "tom", "sawyer"]);
    }

    #[test]
    fn test_no_language_keeps_words() {
        let analyzer = Analyzer::new(TextLanguage::None);
        let terms = analyzer.terms("The Adventures of Tom");
        assert_eq!(terms, vec!["the", "adventures", "of", "tom"]);
    }

    #[test]
    fn test_search_parse() {
        let analyzer = Analyzer::new(TextLanguage::English);
        let search = TextSearch::parse("dragon \"lost city\" -magic", &analyzer);

        assert_eq!(search.terms, vec!["dragon", "lost", "citi"]);
        assert_eq!(search.phrases, vec!["lost city"]);
        assert_eq!(search.negated, vec!["magic"]);
    }

    #[test]
    fn test_search_only_stop_words_is_empty() {
        let analyzer = Analyzer::new(TextLanguage::English);
        assert!(TextSearch::parse("the of and", &analyzer).is_empty());
    }
}
