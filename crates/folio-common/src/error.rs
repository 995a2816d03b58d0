//! Folio Error - Unified Error Types
//!
//! Errors raised outside the document store itself: reading catalog files,
//! decoding JSON and loading configuration. Store errors are carried through
//! unchanged by the crates that talk to the store.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Unified error type for Folio operations.
#[derive(Error, Debug)]
pub enum FolioError {
    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

// =============================================================================
// Type Aliases
// =============================================================================

/// Result type alias for Folio operations.
pub type Result<T> = std::result::Result<T, FolioError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FolioError::Parse {
            line: 3,
            message: "expected object".to_string(),
        };
        assert_eq!(err.to_string(), "parse error at line 3: expected object");

        let err: FolioError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.to_string(), "IO error: gone");
    }

    #[test]
    fn test_json_conversion() {
        let err: FolioError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, FolioError::Json(_)));
    }
}
