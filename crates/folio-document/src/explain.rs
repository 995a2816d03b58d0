//! Folio Execution Statistics
//!
//! How a query was executed: the access path chosen by the planner, how many
//! index keys and documents were examined, how many were returned and how
//! long it took.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Plan Stage
// =============================================================================

/// Access path used to find candidate documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage")]
pub enum PlanStage {
    /// Every document in the collection is examined.
    #[serde(rename = "COLLSCAN")]
    CollScan,
    /// Candidates come from an ascending index lookup.
    #[serde(rename = "IXSCAN")]
    IxScan { index_name: String, field: String },
    /// Candidates come from a text index lookup.
    #[serde(rename = "TEXT")]
    Text { index_name: String, field: String },
}

impl PlanStage {
    pub fn index_name(&self) -> Option<&str> {
        match self {
            Self::CollScan => None,
            Self::IxScan { index_name, .. } | Self::Text { index_name, .. } => Some(index_name),
        }
    }
}

impl fmt::Display for PlanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CollScan => write!(f, "COLLSCAN"),
            Self::IxScan { index_name, .. } => write!(f, "IXSCAN ({})", index_name),
            Self::Text { index_name, .. } => write!(f, "TEXT ({})", index_name),
        }
    }
}

// =============================================================================
// Execution Statistics
// =============================================================================

/// Statistics of one query execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStats {
    pub collection: String,
    pub plan: PlanStage,
    pub n_returned: usize,
    pub total_keys_examined: usize,
    pub total_docs_examined: usize,
    pub execution_time_micros: u64,
}

impl ExecutionStats {
    pub fn new(collection: impl Into<String>, plan: PlanStage) -> Self {
        Self {
            collection: collection.into(),
            plan,
            n_returned: 0,
            total_keys_examined: 0,
            total_docs_examined: 0,
            execution_time_micros: 0,
        }
    }

    /// Name of the index the query used, if any.
    pub fn index_used(&self) -> Option<&str> {
        self.plan.index_name()
    }

    pub fn is_collection_scan(&self) -> bool {
        self.plan == PlanStage::CollScan
    }
}

impl fmt::Display for ExecutionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {}: returned {}, keys examined {}, docs examined {}, {:.3} ms",
            self.plan,
            self.collection,
            self.n_returned,
            self.total_keys_examined,
            self.total_docs_examined,
            self.execution_time_micros as f64 / 1000.0
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_used() {
        let stats = ExecutionStats::new("books", PlanStage::CollScan);
        assert!(stats.is_collection_scan());
        assert_eq!(stats.index_used(), None);

        let stats = ExecutionStats::new(
            "books",
            PlanStage::IxScan {
                index_name: "language_1".to_string(),
                field: "language".to_string(),
            },
        );
        assert!(!stats.is_collection_scan());
        assert_eq!(stats.index_used(), Some("language_1"));
    }

    #[test]
    fn test_serialized_shape() {
        let mut stats = ExecutionStats::new("books", PlanStage::CollScan);
        stats.n_returned = 3;
        stats.total_docs_examined = 10;

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["plan"]["stage"], "COLLSCAN");
        assert_eq!(json["nReturned"], 3);
        assert_eq!(json["totalDocsExamined"], 10);
    }

    #[test]
    fn test_display() {
        let mut stats = ExecutionStats::new("books", PlanStage::CollScan);
        stats.execution_time_micros = 1500;
        let text = stats.to_string();
        assert!(text.starts_with("COLLSCAN on books"));
        assert!(text.ends_with("1.500 ms"));
    }
}
