//! Folio Common - Shared Types and Utilities
//!
//! Error handling and configuration shared by the Folio document store,
//! the book catalog queries and the command line runner.
//!
//! Key Features:
//! - Unified error type with user vs system classification
//! - TOML configuration for the store, the catalog loader and the queries
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

pub mod config;
pub mod error;

pub use config::{CatalogConfig, FolioConfig, QueryConfig, StoreConfig};
pub use error::{FolioError, Result};
