//! Folio Aggregation Pipeline
//!
//! Multi-stage processing of collection documents: unwind, group with
//! accumulators and sort.
//!
//! @version 0.1.0
//! @author AutomataNexus Development Team

use crate::error::{DocumentError, DocumentResult};
use crate::explain::ExecutionStats;
use crate::query::Sort;
use crate::types::{FieldAccess, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

// =============================================================================
// Stages
// =============================================================================

/// One stage of an aggregation pipeline. Rows flowing between stages are
/// object values with the document id under `_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stage {
    /// One output row per element of the array at `path`. Rows whose array is
    /// missing, null or empty are dropped; a non-array value passes through
    /// as a single row.
    Unwind { path: String },
    /// Group rows by the value at `key` (all rows together when `None`).
    Group {
        key: Option<String>,
        accumulators: Vec<(String, Accumulator)>,
    },
    /// Sort rows; ties keep ascending `_id` order.
    Sort(Sort),
}

// =============================================================================
// Accumulators
// =============================================================================

/// Aggregation function computed per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Accumulator {
    /// Add a constant per row; `SumConst(1)` counts rows.
    SumConst(i64),
    /// Mean of the numeric values of a field; null, missing and non-numeric
    /// values are skipped. Null when the group has no numeric values.
    Avg(String),
}

/// Running state of one accumulator, in the style of a streaming aggregator.
#[derive(Debug, Clone, Default)]
struct AccumulatorState {
    sum: i64,
    float_sum: f64,
    numeric: usize,
}

impl AccumulatorState {
    fn add(&mut self, acc: &Accumulator, row: &Value) {
        match acc {
            Accumulator::SumConst(n) => {
                self.sum = self.sum.saturating_add(*n);
            }
            Accumulator::Avg(field) => {
                if let Some(n) = row.field(field).and_then(Value::as_f64) {
                    self.float_sum += n;
                    self.numeric += 1;
                }
            }
        }
    }

    fn value(&self, acc: &Accumulator) -> Value {
        match acc {
            Accumulator::SumConst(_) => Value::Int(self.sum),
            Accumulator::Avg(_) if self.numeric == 0 => Value::Null,
            Accumulator::Avg(_) => Value::Float(self.float_sum / self.numeric as f64),
        }
    }
}

/// Group key ordered like [`Value::total_cmp`].
#[derive(Debug, Clone)]
struct GroupKey(Value);

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.loose_eq(&other.0)
    }
}

impl Eq for GroupKey {}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// An aggregation pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn unwind(self, path: impl Into<String>) -> Self {
        self.stage(Stage::Unwind { path: path.into() })
    }

    pub fn group(self, key: Option<&str>, accumulators: Vec<(&str, Accumulator)>) -> Self {
        self.stage(Stage::Group {
            key: key.map(String::from),
            accumulators: accumulators
                .into_iter()
                .map(|(name, acc)| (name.to_string(), acc))
                .collect(),
        })
    }

    pub fn sort(self, field: impl Into<String>, ascending: bool) -> Self {
        self.stage(Stage::Sort(Sort {
            field: field.into(),
            ascending,
        }))
    }

    /// Check the pipeline is well formed before running it.
    pub fn validate(&self) -> DocumentResult<()> {
        for stage in &self.stages {
            let Stage::Group { accumulators, .. } = stage else {
                continue;
            };
            for (name, _) in accumulators {
                if name.is_empty() || name == "_id" || name.contains('.') {
                    return Err(DocumentError::InvalidPipeline(format!(
                        "invalid accumulator name '{}'",
                        name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Run the whole pipeline over the rows.
    pub fn execute(&self, mut rows: Vec<Value>) -> DocumentResult<Vec<Value>> {
        self.validate()?;
        for stage in &self.stages {
            rows = run_stage(stage, rows);
        }
        Ok(rows)
    }
}

fn run_stage(stage: &Stage, rows: Vec<Value>) -> Vec<Value> {
    match stage {
        Stage::Unwind { path } => unwind(rows, path),
        Stage::Group { key, accumulators } => group(rows, key.as_deref(), accumulators),
        Stage::Sort(sort) => {
            let mut rows = rows;
            let null = Value::Null;
            rows.sort_by(|a, b| {
                sort.compare(a, b).then_with(|| {
                    a.field("_id")
                        .unwrap_or(&null)
                        .total_cmp(b.field("_id").unwrap_or(&null))
                })
            });
            rows
        }
    }
}

fn unwind(rows: Vec<Value>, path: &str) -> Vec<Value> {
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        match row.field(path) {
            Some(Value::Array(items)) => {
                for item in items.clone() {
                    let mut expanded = row.clone();
                    set_path(&mut expanded, path, item);
                    out.push(expanded);
                }
            }
            Some(Value::Null) | None => {}
            Some(_) => out.push(row),
        }
    }

    out
}

fn set_path(target: &mut Value, path: &str, value: Value) {
    let Value::Object(obj) = target else {
        return;
    };
    match path.split_once('.') {
        Some((head, rest)) => {
            if let Some(child) = obj.get_mut(head) {
                set_path(child, rest, value);
            }
        }
        None => {
            obj.insert(path.to_string(), value);
        }
    }
}

fn group(rows: Vec<Value>, key: Option<&str>, accumulators: &[(String, Accumulator)]) -> Vec<Value> {
    let mut groups: BTreeMap<GroupKey, Vec<AccumulatorState>> = BTreeMap::new();

    for row in &rows {
        let key_value = key
            .and_then(|k| row.field(k))
            .cloned()
            .unwrap_or(Value::Null);

        let states = groups
            .entry(GroupKey(key_value))
            .or_insert_with(|| vec![AccumulatorState::default(); accumulators.len()]);

        for (state, (_, acc)) in states.iter_mut().zip(accumulators) {
            state.add(acc, row);
        }
    }

    groups
        .into_iter()
        .map(|(key, states)| {
            let mut obj = BTreeMap::new();
            obj.insert("_id".to_string(), key.0);
            for (state, (name, acc)) in states.iter().zip(accumulators) {
                obj.insert(name.clone(), state.value(acc));
            }
            Value::Object(obj)
        })
        .collect()
}

// =============================================================================
// Aggregate Result
// =============================================================================

/// Output rows of an aggregation with the statistics of its execution.
#[derive(Debug, Clone)]
pub struct AggregateResult {
    pub rows: Vec<Value>,
    pub stats: ExecutionStats,
}

// =============================================================================
// Tests
// =============================================================================
