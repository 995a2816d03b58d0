//! Folio Catalog Errors
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use folio_common::FolioError;
use folio_document::DocumentError;
use thiserror::Error;

/// Errors raised by catalog queries and the catalog loader. Store and file
/// errors pass through unchanged.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Store(#[from] DocumentError),

    #[error(transparent)]
    Folio(#[from] FolioError),
}

/// Result type alias for catalog operations.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Folio(FolioError::Io(err))
    }
}

impl CatalogError {
    /// The underlying store error, if this is one.
    pub fn store_error(&self) -> Option<&DocumentError> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_is_unchanged() {
        let err: CatalogError = DocumentError::IndexNotFound("title_text".to_string()).into();
        assert_eq!(err.to_string(), "index not found: title_text");
        assert_eq!(
            err.store_error(),
            Some(&DocumentError::IndexNotFound("title_text".to_string()))
        );
    }

    #[test]
    fn test_io_error_wraps_as_folio() {
        let err: CatalogError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, CatalogError::Folio(FolioError::Io(_))));
        assert!(err.store_error().is_none());
    }
}
