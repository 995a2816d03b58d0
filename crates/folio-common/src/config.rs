//! Folio Config - Configuration Structures
//!
//! Configuration for the embedded store, the catalog loader and the query
//! suite. Loaded from a TOML file; every key is optional and falls back to
//! the defaults below.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// =============================================================================
// Store Configuration
// =============================================================================

/// Limits applied by the embedded document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub max_document_size: usize,
    pub max_collections: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_document_size: 16 * 1024 * 1024, // 16MB
            max_collections: 1000,
        }
    }
}

// =============================================================================
// Catalog Configuration
// =============================================================================

/// Where the book catalog comes from and how it is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub collection: String,
    pub data_file: Option<PathBuf>,
    pub batch_size: usize,
    pub companion_collections: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            collection: "books".to_string(),
            data_file: None,
            batch_size: 1000,
            companion_collections: true,
        }
    }
}

// =============================================================================
// Query Configuration
// =============================================================================

/// Parameters of the catalog queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub language: String,
    pub top_n: usize,
    pub text_language: String,
    pub search_term: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            top_n: 5,
            text_language: "en".to_string(),
            search_term: "adventure".to_string(),
        }
    }
}

// =============================================================================
// Top-level Configuration
// =============================================================================

/// Top-level Folio configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FolioConfig {
    pub store: StoreConfig,
    pub catalog: CatalogConfig,
    pub queries: QueryConfig,
}

impl FolioConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| crate::FolioError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the loader and queries cannot work with.
    pub fn validate(&self) -> crate::Result<()> {
        if self.catalog.batch_size == 0 {
            return Err(crate::FolioError::Configuration(
                "catalog.batch_size must be greater than zero".to_string(),
            ));
        }
        if self.catalog.collection.is_empty() {
            return Err(crate::FolioError::Configuration(
                "catalog.collection must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = FolioConfig::default();
        assert_eq!(config.catalog.collection, "books");
        assert_eq!(config.catalog.batch_size, 1000);
        assert_eq!(config.queries.language, "en");
        assert_eq!(config.queries.top_n, 5);
        assert_eq!(config.queries.search_term, "adventure");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FolioConfig::from_toml(
            r#"
            [queries]
            top_n = 10

            [catalog]
            data_file = "books.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.queries.top_n, 10);
        assert_eq!(config.queries.language, "en");
        assert_eq!(config.catalog.data_file, Some(PathBuf::from("books.json")));
        assert_eq!(config.catalog.batch_size, 1000);
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_invalid_batch_size() {
        let result = FolioConfig::from_toml("[catalog]\nbatch_size = 0\n");
        assert!(matches!(result, Err(crate::FolioError::Configuration(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[queries]\nsearch_term = \"dragon\"").unwrap();

        let config = FolioConfig::from_file(file.path()).unwrap();
        assert_eq!(config.queries.search_term, "dragon");
    }

    #[test]
    fn test_malformed_toml() {
        let result = FolioConfig::from_toml("[queries\n");
        assert!(matches!(result, Err(crate::FolioError::Configuration(_))));
    }
}
