//! Folio Document - Embedded Document Store
//!
//! Schema-flexible document collections with the query surface a book
//! catalog needs: equality and pattern filters, ascending and text indexes,
//! aggregation pipelines and execution statistics.
//!
//! Key Features:
//! - JSON documents with dotted field paths
//! - Ascending single-field indexes and stemmed text indexes
//! - Unwind, group and sort aggregation stages
//! - Explain statistics for every query
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

pub mod types;
pub mod error;
pub mod text;
pub mod index;
pub mod query;
pub mod explain;
pub mod aggregation;
pub mod collection;
pub mod engine;

pub use types::{Document, DocumentId, FieldAccess, Value};
pub use error::{DocumentError, DocumentResult};
pub use text::{Analyzer, TextLanguage, TextSearch};
pub use index::{DocumentIndex, IndexSpec, IndexType};
pub use query::{Filter, Query, QueryBuilder, QueryResult, Sort};
pub use explain::{ExecutionStats, PlanStage};
pub use aggregation::{Accumulator, AggregateResult, Pipeline, Stage};
pub use collection::Collection;
pub use engine::{DocumentEngine, EngineConfig};
