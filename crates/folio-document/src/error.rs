//! Folio Document Errors
//!
//! Errors raised by the document store. Callers above the store surface
//! these unchanged.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::types::DocumentId;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur in the document store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    // Collection errors
    #[error("collection already exists: {0}")]
    CollectionExists(String),

    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("maximum number of collections reached")]
    TooManyCollections,

    // Document errors
    #[error("document with ID {0} already exists")]
    DuplicateId(DocumentId),

    #[error("document of {size} bytes exceeds maximum size of {max} bytes")]
    DocumentTooLarge { size: usize, max: usize },

    // Index errors
    #[error("index not found: {0}")]
    IndexNotFound(String),

    #[error("index conflict: {0}")]
    IndexConflict(String),

    #[error("unsupported text search language: {0}")]
    UnsupportedLanguage(String),

    // Query errors
    #[error("invalid pipeline: {0}")]
    InvalidPipeline(String),

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Result type alias for document store operations.
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;
